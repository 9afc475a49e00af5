use std::io::{self, BufRead, Write};
use std::path::Path;

use tracing::warn;
use tracing_subscriber::EnvFilter;
use transcript_store::TranscriptStore;

use sigma::app::Role;
use sigma::commands::{parse_slash_command, SlashCommand};
use sigma::config::EnvConfig;
use sigma::controller::{ConversationController, ReplyView, TurnError};
use sigma::course_materials::{resources_for, CourseResource};
use sigma::prompts::{self, CoursePrompt};
use sigma::providers;

const HELP_TEXT: &str = "Commands: /help, /restart, /exemplar, /assignment, /quit";

/// Streams the reply to stdout: a typing indicator until the first chunk
/// arrives, then live-appended text.
struct StdoutReplyView {
    receiving: bool,
}

impl StdoutReplyView {
    fn new() -> Self {
        Self { receiving: false }
    }
}

impl ReplyView for StdoutReplyView {
    fn reply_pending(&mut self) {
        self.receiving = false;
        print!("sigma: ...");
        let _ = io::stdout().flush();
    }

    fn reply_chunk(&mut self, text: &str) {
        if !self.receiving {
            // First chunk clears the typing indicator.
            print!("\r          \rsigma: ");
            self.receiving = true;
        }
        print!("{text}");
        let _ = io::stdout().flush();
    }

    fn reply_complete(&mut self) {
        println!();
    }

    fn reply_failed(&mut self, error: &str) {
        if !self.receiving {
            print!("\r");
        } else {
            println!();
        }
        println!("[error] {error}");
    }
}

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let config = EnvConfig::from_env();
    let provider = providers::provider_from_config(&config).map_err(io::Error::other)?;

    let preset = match (config.course.as_deref(), config.week.as_deref()) {
        (Some(course), Some(week)) => prompts::preset_for(course, week).ok_or_else(|| {
            io::Error::other(format!(
                "No prompt script for course '{course}' week '{week}'"
            ))
        })?,
        _ => prompts::default_preset(),
    };

    let mut controller = build_controller(&config, provider, preset)?;

    println!(
        "Sigma - Learning Mentor ({} / {})",
        controller.provider_profile().provider_id,
        controller.provider_profile().model_id
    );
    println!("{HELP_TEXT}");
    println!();
    print_history(&controller);

    let resources = resources_for(preset);
    let stdin = io::stdin();
    let mut view = StdoutReplyView::new();

    prompt_for_input()?;
    for line in stdin.lock().lines() {
        let line = line?;
        let input = line.trim();

        if input.is_empty() {
            prompt_for_input()?;
            continue;
        }

        if let Some(command) = parse_slash_command(input) {
            match command {
                SlashCommand::Help => println!("{HELP_TEXT}"),
                SlashCommand::Restart => {
                    controller.restart().map_err(io::Error::other)?;
                    println!("Conversation restarted.");
                    println!();
                    print_history(&controller);
                }
                SlashCommand::Exemplar => show_resource(&mut controller, &resources, true),
                SlashCommand::Assignment => show_resource(&mut controller, &resources, false),
                SlashCommand::Quit => {
                    controller.quit();
                }
                SlashCommand::Unknown(command) => println!("Unknown command: {command}"),
            }
        } else {
            match controller.submit(input, &mut view) {
                Ok(_reply) => {}
                Err(TurnError::EmptyInput) => {}
                // The view already rendered the failure; the conversation
                // is back in idle and the student may resubmit.
                Err(error) => warn!(%error, "turn aborted"),
            }
        }

        if controller.chat().should_exit() {
            break;
        }

        prompt_for_input()?;
    }

    Ok(())
}

fn build_controller(
    config: &EnvConfig,
    provider: std::sync::Arc<dyn chat_provider::ChatProvider>,
    preset: &CoursePrompt,
) -> io::Result<ConversationController> {
    if let Some(path) = &config.resume_transcript {
        let store = TranscriptStore::open(Path::new(path)).map_err(io::Error::other)?;
        return Ok(ConversationController::resume(
            provider,
            store,
            preset.system_prompt,
            preset.opening_message,
            config.temperature,
        ));
    }

    let store = std::env::current_dir()
        .map_err(io::Error::other)
        .and_then(|cwd| {
            TranscriptStore::create_new(&cwd, preset.tags()).map_err(io::Error::other)
        });
    let store = match store {
        Ok(store) => Some(store),
        Err(error) => {
            warn!(%error, "transcript store unavailable; continuing without persistence");
            None
        }
    };

    let session_id = store
        .as_ref()
        .map(|store| store.header().session_id.clone())
        .unwrap_or_else(|| "unpersisted-session".to_string());

    ConversationController::new(
        provider,
        store,
        session_id,
        preset.system_prompt,
        preset.opening_message,
        config.temperature,
    )
    .map_err(io::Error::other)
}

fn print_history(controller: &ConversationController) {
    for message in controller.chat().view() {
        match message.role {
            Role::Assistant => println!("sigma: {}", message.content),
            Role::User => println!("you: {}", message.content),
            Role::System => println!("[note] {}", message.content),
        }
    }
}

fn show_resource(
    controller: &mut ConversationController,
    resources: &[CourseResource],
    want_exemplar: bool,
) {
    let found = resources.iter().find(|resource| {
        matches!(resource, CourseResource::Exemplar(_)) == want_exemplar
    });

    match found {
        Some(resource) => {
            controller.show_resource(resource);
            println!("{}:\n{}", resource.name(), resource.invoke());
        }
        None => println!("No such material is available for this course."),
    }
}

fn prompt_for_input() -> io::Result<()> {
    print!("you: ");
    io::stdout().flush()
}
