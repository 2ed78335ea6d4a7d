use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use relia::analysis::ReviewAnalyzer;
use relia::api::{create_router, AppState};
use relia::classify::{
    BayesClassifier, CriticalityTable, LexiconSentiment, PhraseClassifier, SentimentScorer,
};
use relia::config::Config;
use relia::nlp::{DependencyParser, HttpParser, HttpTagger, TemporalTagger};

#[derive(Parser)]
#[command(name = "relia")]
#[command(about = "Turns product reviews into structured reliability reports")]
struct Args {
    /// Override the configured listen port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "relia=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    let parser = Arc::new(HttpParser::new(&config.nlp)?);
    if !parser.is_available() {
        tracing::warn!("Dependency parser unavailable - set PARSER_URL to enable analysis");
    }

    let tagger = Arc::new(HttpTagger::new(&config.nlp)?);
    if !tagger.is_available() {
        tracing::warn!("Temporal tagger unavailable - set TAGGER_URL to enable analysis");
    }

    tracing::info!(
        "Loading relevance corpus: {}...",
        config.training.relevance_path
    );
    let relevance: Arc<dyn PhraseClassifier> =
        Arc::new(BayesClassifier::from_path(&config.training.relevance_path)?);

    tracing::info!(
        "Loading issue-detection corpus: {}...",
        config.training.issue_detection_path
    );
    let issue_detect: Arc<dyn PhraseClassifier> = Arc::new(BayesClassifier::from_path(
        &config.training.issue_detection_path,
    )?);

    tracing::info!(
        "Loading issue-class corpus: {}...",
        config.training.issue_class_path
    );
    let issue_class: Arc<dyn PhraseClassifier> = Arc::new(BayesClassifier::from_path(
        &config.training.issue_class_path,
    )?);

    let sentiment: Arc<dyn SentimentScorer> = Arc::new(LexiconSentiment::from_path(
        &config.training.sentiment_lexicon_path,
    )?);

    let analyzer = ReviewAnalyzer::new(
        parser.clone() as Arc<dyn DependencyParser>,
        tagger.clone() as Arc<dyn TemporalTagger>,
        relevance,
        issue_detect,
        issue_class,
        sentiment,
        Arc::new(CriticalityTable::default()),
        config.analyzer.clone(),
    );

    let host = config.server.host.clone();
    let port = args.port.unwrap_or(config.server.port);

    let state = AppState::new(config, parser, tagger, analyzer);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    tracing::info!("Listening on {}:{}", host, port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install shutdown handler: {}", e);
        return;
    }
    tracing::info!("Shutting down");
}
