use anyhow::Result;
use clap::{Parser, Subcommand};
use filmo_core::persist::{save_catalog, save_meta, save_similarity, ArtifactPaths, MetaFile, FORMAT_VERSION};
use filmo_core::{build_tags, cosine_similarity_matrix, CountVectorizer, Recommender, DEFAULT_MAX_FEATURES, DEFAULT_TOP_K};
use std::path::Path;
use tracing_subscriber::{fmt, EnvFilter};

mod dataset;

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build movie tag catalog and similarity artifacts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build catalog and similarity artifacts from the raw movies and credits CSVs
    Build {
        /// Movies table (title, genres, keywords, overview, ...)
        #[arg(long, default_value = "tmdb_5000_movies.csv")]
        movies: String,
        /// Credits table (movie_id, title, cast, crew)
        #[arg(long, default_value = "tmdb_5000_credits.csv")]
        credits: String,
        /// Output artifact directory
        #[arg(long, default_value = "./artifacts")]
        output: String,
        /// Vocabulary size bound
        #[arg(long, default_value_t = DEFAULT_MAX_FEATURES)]
        max_features: usize,
    },
    /// Print the recommendations for a title from built artifacts
    Recommend {
        #[arg(long, default_value = "./artifacts")]
        artifacts: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        k: usize,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { movies, credits, output, max_features } => {
            build_artifacts(Path::new(&movies), Path::new(&credits), &output, max_features)
        }
        Commands::Recommend { artifacts, title, k } => {
            let recommender = Recommender::load(&ArtifactPaths::new(&artifacts))?;
            for rec in recommender.recommend_top_k(&title, k)? {
                println!("{}", rec.title);
            }
            Ok(())
        }
    }
}

fn build_artifacts(movies: &Path, credits: &Path, output: &str, max_features: usize) -> Result<()> {
    let movie_rows = dataset::read_movies(movies)?;
    let credit_rows = dataset::read_credits(credits)?;
    tracing::info!(movies = movie_rows.len(), credits = credit_rows.len(), "read raw tables");

    let raw = dataset::join_on_title(movie_rows, credit_rows);
    let (catalog, stats) = build_tags(&raw)?;
    if catalog.is_empty() {
        anyhow::bail!("no complete records after dropping rows with missing fields");
    }

    let vectorizer = CountVectorizer::new(max_features);
    let (vocabulary, vectors) = vectorizer.fit_transform(&catalog.tag_strings());
    let zero_vectors = vectors.iter().filter(|v| v.is_zero()).count();
    if zero_vectors > 0 {
        tracing::warn!(zero_vectors, "records with no vocabulary overlap score 0 against every title");
    }
    let matrix = cosine_similarity_matrix(&vectors, vocabulary.len());
    tracing::info!(records = catalog.len(), vocabulary = vocabulary.len(), "computed similarity matrix");

    // Everything is computed before the first write.
    let out_paths = ArtifactPaths::new(output);
    save_catalog(&out_paths, &catalog)?;
    save_similarity(&out_paths, &catalog, &matrix)?;
    let meta = MetaFile {
        num_movies: catalog.len() as u32,
        vocabulary_size: vocabulary.len() as u32,
        dropped_records: stats.dropped as u32,
        checksum: catalog.checksum(),
        created_at: time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339).unwrap_or_else(|_| "".into()),
        version: FORMAT_VERSION,
    };
    save_meta(&out_paths, &meta)?;

    tracing::info!(output, "artifact build complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn builds_loadable_artifacts_from_csv() {
        let dir = tempdir().unwrap();
        let movies = dir.path().join("movies.csv");
        let credits = dir.path().join("credits.csv");
        std::fs::write(
            &movies,
            "genres,keywords,overview,title\n\
             \"[{\"\"name\"\": \"\"Science Fiction\"\"}]\",[],Blue planet,Avatar\n\
             \"[{\"\"name\"\": \"\"Science Fiction\"\"}]\",[],Red planet,John Carter\n\
             \"[{\"\"name\"\": \"\"Animation\"\"}]\",[],Long hair,Tangled\n\
             [],[],,Missing Overview\n",
        )
        .unwrap();
        std::fs::write(
            &credits,
            "movie_id,title,cast,crew\n\
             19995,Avatar,[],[]\n\
             49529,John Carter,[],[]\n\
             38757,Tangled,[],[]\n\
             1,Missing Overview,[],[]\n",
        )
        .unwrap();
        let out = dir.path().join("artifacts");
        build_artifacts(&movies, &credits, out.to_str().unwrap(), 100).unwrap();

        let paths = ArtifactPaths::new(&out);
        let meta = filmo_core::persist::load_meta(&paths).unwrap();
        assert_eq!(meta.num_movies, 3);
        assert_eq!(meta.dropped_records, 1);
        let rec = Recommender::load(&paths).unwrap();
        assert_eq!(rec.recommend_titles("Avatar").unwrap(), vec!["John Carter", "Tangled"]);
    }

    #[test]
    fn malformed_field_writes_nothing() {
        let dir = tempdir().unwrap();
        let movies = dir.path().join("movies.csv");
        let credits = dir.path().join("credits.csv");
        std::fs::write(&movies, "genres,keywords,overview,title\nnot-a-list,[],Plot,Avatar\n").unwrap();
        std::fs::write(&credits, "movie_id,title,cast,crew\n1,Avatar,[],[]\n").unwrap();
        let out = dir.path().join("artifacts");
        assert!(build_artifacts(&movies, &credits, out.to_str().unwrap(), 100).is_err());
        assert!(!out.exists());
    }
}
