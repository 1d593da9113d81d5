use banking_assistant::agent::Assistant;
use banking_assistant::config::Settings;
use banking_assistant::dialogue::DialogueSession;
use colored::Colorize;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::info;

/// Greeting phrases answered locally, without a model call.
const GREETINGS: &[&str] = &[
    "hi", "hii", "hello",
    "გამარჯობა", "სალამი", "ჰაი",
    "gamarjoba", "salami",
];

/// Phrases that end the session.
const QUIT_WORDS: &[&str] = &[
    "exit", "bye", "kargad", "naxvamdis",
    "ნახვამდის", "მადლობ", "მადლობა", "წავედი", "კარგად",
];

const GREETING_REPLY: &str =
    "გამარჯობა! 👋 Glad you wrote to me — how can I help you?";
const GOODBYE: &str = "ნახვამდის! 👋";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let settings = Settings::from_env()?;

    info!(model = %settings.model, bank = %settings.bank_name, "Banking assistant starting");

    let mut assistant = Assistant::new(&settings);
    let mut session = DialogueSession::new();

    println!(
        "Welcome to the {} assistant. Ask me anything about banking, \
         exchange rates, weather or time.\n\
         To finish the session, say \"ნახვამდის\" or \"bye\". \
         Type /usage for usage statistics.",
        settings.bank_name.bold()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let bot_label = "Bot:".bold().green();

    loop {
        print!("{} ", "You:".bold().cyan());
        std::io::stdout().flush()?;

        // Ctrl-C ends the session like a quit phrase.
        let line = tokio::select! {
            _ = signal::ctrl_c() => {
                println!("\n{}", GOODBYE);
                break;
            }
            line = lines.next_line() => line?,
        };

        // EOF (ctrl-d) too.
        let Some(line) = line else {
            println!("\n{}", GOODBYE);
            break;
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let lowered = input.to_lowercase();

        if GREETINGS.contains(&lowered.as_str()) {
            println!("{} {}", bot_label, GREETING_REPLY);
            continue;
        }

        if QUIT_WORDS.contains(&lowered.as_str()) {
            println!("{}", GOODBYE);
            break;
        }

        if lowered == "/usage" {
            println!("{}", assistant.usage_summary());
            continue;
        }

        // Active account-opening flow consumes every input.
        if session.is_active() {
            if let Some(reply) = session.handle(input) {
                println!("{} {}", bot_label, reply);
            }
            continue;
        }

        // Account-opening trigger phrases start the flow.
        if let Some(menu) = session.try_open(input) {
            println!("{} {}", bot_label, menu);
            continue;
        }

        // Everything else goes to the model with the tool set declared.
        match assistant.respond(input).await {
            Ok(answer) => println!("{} {}", bot_label, answer),
            Err(e) => eprintln!("{} {}", "Error:".bold().red(), e),
        }
    }

    Ok(())
}
