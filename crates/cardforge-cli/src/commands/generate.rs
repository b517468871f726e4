//! Generate command - fill a field with the configured AI provider.

use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use colored::Colorize;
use cardforge::assist::{
    ensure_ready_for_book_generation, parse_book_entry, parse_tags, AssistSettings,
    CancellationToken, FieldGenerator, GenerationRequest,
};
use cardforge::card::FieldKind;
use cardforge::{CardError, CardField, FieldValue, Workspace};

use crate::cli::ProviderChoice;

use super::{open_workspace, save_in_place, CommandResult};

pub fn run(
    card: PathBuf,
    field: String,
    prompt: String,
    system: Option<String>,
    settings_path: PathBuf,
    provider: Option<ProviderChoice>,
    verbose: bool,
) -> CommandResult {
    let field: CardField = field.parse()?;
    if field.kind() == FieldKind::Map {
        return Err(format!("Field '{}' cannot be generated", field).into());
    }

    let mut settings = AssistSettings::load_or_default(&settings_path)?;
    if let Some(choice) = provider {
        settings.provider = choice.into();
    }

    let mut workspace = open_workspace(&card)?;
    if field == CardField::CharacterBook {
        ensure_ready_for_book_generation(&workspace.document)?;
    }

    let generator = settings.build_generator()?;
    println!(
        "{} {} with {}",
        "Generating".cyan().bold(),
        field.to_string().white(),
        generator.name().cyan()
    );
    if verbose {
        println!("  Model: {}", settings.effective_model().dimmed());
    }

    let token = CancellationToken::new();
    let handler_token = token.clone();
    ctrlc::set_handler(move || handler_token.cancel())
        .map_err(|e| format!("Failed to install Ctrl-C handler: {}", e))?;

    let mut request = GenerationRequest::new(prompt);
    if let Some(system) = system {
        request = request.with_system(system);
    }

    let text = generate_cancellable(generator, request, &token)?;
    apply(&mut workspace, field, &text)?;
    save_in_place(&card, &workspace)?;

    println!(
        "{} {}",
        "Inserted generated".green().bold(),
        field.to_string().cyan()
    );
    Ok(())
}

/// Run the request on a worker thread so Ctrl-C returns immediately.
/// A reply arriving after cancellation is discarded.
fn generate_cancellable(
    generator: Box<dyn FieldGenerator>,
    request: GenerationRequest,
    token: &CancellationToken,
) -> Result<String, CardError> {
    let (tx, rx) = mpsc::channel();
    let worker_token = token.clone();
    thread::spawn(move || {
        let _ = tx.send(generator.generate(&request, &worker_token));
    });

    loop {
        token.check()?;
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(result) => {
                token.check()?;
                return result;
            }
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                return Err(CardError::Generation("generation worker stopped".to_string()));
            }
        }
    }
}

fn apply(workspace: &mut Workspace, field: CardField, text: &str) -> Result<(), CardError> {
    match field {
        CardField::CharacterBook => {
            let fallback = workspace.document.data.name.clone();
            workspace.push_book_entry(parse_book_entry(text, &fallback));
            Ok(())
        }
        CardField::Tags => workspace.insert_field(field, FieldValue::List(parse_tags(text))),
        CardField::AlternateGreetings => {
            let mut greetings = workspace.document.data.alternate_greetings.clone();
            greetings.push(text.trim().to_string());
            workspace.insert_field(field, FieldValue::List(greetings))
        }
        _ => workspace.insert_field(field, FieldValue::Text(text.trim().to_string())),
    }
}
