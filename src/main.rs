use std::sync::Arc;

use dotenvy::dotenv;
use quizdrillbot::config::Config;
use quizdrillbot::engine::QuizEngine;
use quizdrillbot::questions::QuestionStore;
use quizdrillbot::registry::UserRegistry;
use quizdrillbot::schema::schema;
use teloxide::error_handlers::IgnoringErrorHandlerSafe;
use teloxide::prelude::*;
use teloxide::update_listeners::webhooks::{self, Options};
use tracing::level_filters;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() {
    dotenv().ok();

    let rust_log = std::env::var("LOG_LEVEL").unwrap_or("info".into());
    tracing_subscriber::fmt()
        .with_max_level(level_filters::LevelFilter::from_level(
            rust_log.parse().expect("LOG_LEVEL should be a valid level"),
        ))
        .json()
        .with_span_events(FmtSpan::ENTER)
        .log_internal_errors(true)
        .with_ansi(true)
        .with_line_number(true)
        .with_target(false)
        .init();

    let config = Arc::new(Config::from_env().expect("Configuration should be valid."));

    let questions = Arc::new(
        QuestionStore::load(&config.questions_file).expect("Question file should load."),
    );
    log::info!(
        "Loaded {} questions from {}",
        questions.len(),
        config.questions_file.display()
    );

    let registry = Arc::new(UserRegistry::load(config.users_file.clone()));
    log::info!("{} users known", registry.count());

    let engine = Arc::new(QuizEngine::new(questions));

    let teloxide_token = std::env::var("TELOXIDE_TOKEN").expect("TELOXIDE_TOKEN should be set.");
    let bot = Bot::new(teloxide_token);
    log::info!("Starting bot...");

    let mut dispatcher = Dispatcher::builder(bot.clone(), schema())
        .dependencies(dptree::deps![engine, registry, Arc::clone(&config)])
        .enable_ctrlc_handler()
        .build();

    if let (Some(ngrok_url), Some(ngrok_addr)) = (config.ngrok_url.clone(), config.ngrok_addr) {
        let listener = webhooks::axum(bot, Options::new(ngrok_addr, ngrok_url))
            .await
            .expect("Failed to build a listener.");
        dispatcher
            .dispatch_with_listener(listener, Arc::new(IgnoringErrorHandlerSafe))
            .await
    } else {
        dispatcher.dispatch().await
    }
}
