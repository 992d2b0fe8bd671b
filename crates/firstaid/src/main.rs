//! `firstaid` - CLI for the guided first-aid assistant
//!
//! This binary runs guided sessions in the terminal and provides commands for
//! inspecting guides, contacts and configuration.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::{anyhow, bail};
use clap::Parser;
use tracing::warn;

use firstaid::cli::{
    CallCommand, CategoriesCommand, Cli, Command, ConfigCommand, ContactsCommand, ShowCommand,
    StartCommand,
};
use firstaid::console::Console;
use firstaid::platform;
use firstaid::registry::GuideRegistry;
use firstaid::{init_logging, Assistant, Config, EmergencyLine, Guide, Narration, Selection, Step};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // A broken config file must not block an emergency call
    let config = Config::load_or_default(cli.config.clone());
    let registry = GuideRegistry::builtin();

    // Execute the command
    match cli.command {
        Command::Categories(cmd) => handle_categories(&registry, &cmd),
        Command::Start(cmd) => handle_start(&config, &registry, &cmd).await,
        Command::Show(cmd) => handle_show(&config, &registry, &cmd),
        Command::Call(cmd) => handle_call(&config, &cmd).await,
        Command::Contacts(cmd) => handle_contacts(&config, &cmd),
        Command::Validate => handle_validate(&registry),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn emergency_line(config: &Config) -> EmergencyLine {
    EmergencyLine::from_config(
        &config.emergency,
        platform::default_dialer(config.call_timeout()),
    )
}

fn handle_categories(registry: &GuideRegistry, cmd: &CategoriesCommand) -> anyhow::Result<()> {
    if cmd.json {
        let categories: Vec<_> = registry
            .list_categories()
            .iter()
            .map(|category| {
                serde_json::json!({
                    "id": category.id,
                    "title": category.title,
                    "description": category.description,
                    "has_guide": registry.has_guide(&category.id),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&categories)?);
    } else {
        for category in registry.list_categories() {
            let guide = if registry.has_guide(&category.id) {
                "guide"
            } else {
                "call only"
            };
            println!(
                "{:<12} {:<18} [{guide}]  {}",
                category.id, category.title, category.description
            );
        }
    }
    Ok(())
}

async fn handle_start(
    config: &Config,
    registry: &GuideRegistry,
    cmd: &StartCommand,
) -> anyhow::Result<()> {
    // Broken guides escalate to an emergency call at runtime
    if let Err(e) = registry.validate() {
        warn!(error = %e, "Starting with guide integrity problems");
    }

    let enabled = config.narration.enabled && !cmd.no_voice;
    let narration = Narration::new(platform::default_narrator(), config.voice(), enabled);
    let assistant = Assistant::new(registry, narration, emergency_line(config));

    let mut console = Console::stdio();
    let result = assistant.run(&mut console, cmd.category.as_deref()).await;
    assistant.narration().stop();
    if let Err(e) = result {
        eprintln!(
            "The guide stopped unexpectedly. Call the emergency number {} now.",
            config.emergency.number
        );
        return Err(e.into());
    }
    Ok(())
}

fn handle_show(config: &Config, registry: &GuideRegistry, cmd: &ShowCommand) -> anyhow::Result<()> {
    let guide = match registry.select(&cmd.category) {
        Selection::Available { guide, .. } => guide,
        Selection::NotImplemented(category) => {
            println!(
                "There is no guide for {} yet. In an emergency call {}.",
                category.title, config.emergency.number
            );
            return Ok(());
        }
        Selection::UnknownCategory => bail!("unknown category '{}'", cmd.category),
    };

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(guide)?);
    } else {
        print_guide(guide);
    }
    Ok(())
}

fn print_guide(guide: &Guide) {
    println!("{} ({})", guide.title, guide.id);
    println!("{}", "=".repeat(guide.title.len() + guide.id.len() + 3));

    if let Some(question) = &guide.initial_question {
        println!();
        print_step("Q", question);
    }
    for step in &guide.steps {
        println!();
        print_step(&step.step_number.to_string(), step);
    }

    println!();
    println!("Aftercare:");
    for instruction in &guide.post_care_instructions {
        println!("  - {instruction}");
    }
}

fn print_step(label: &str, step: &Step) {
    println!("[{label}] {} ({})", step.title, step.id);
    println!("    {}", step.instruction);
    for option in &step.question_options {
        let target = match (&option.next_step_id, &option.next_flow) {
            (Some(step_id), _) => format!("-> {step_id}"),
            (None, Some(flow)) => format!("=> {flow}"),
            (None, None) => "(no target)".to_string(),
        };
        println!("    * {} {target}", option.text);
    }
}

async fn handle_call(config: &Config, cmd: &CallCommand) -> anyhow::Result<()> {
    let line = emergency_line(config);

    let number = match (&cmd.contact, &cmd.number) {
        (Some(id), _) => line
            .contact(id)
            .map(|contact| contact.number.clone())
            .ok_or_else(|| anyhow!("unknown contact '{id}'"))?,
        (None, Some(number)) => number.clone(),
        (None, None) => line.number().to_string(),
    };

    let outcome = line.call(&number).await;
    println!("{}", outcome.message());
    Ok(())
}

fn handle_contacts(config: &Config, cmd: &ContactsCommand) -> anyhow::Result<()> {
    let contacts = &config.emergency.contacts;
    if cmd.json {
        println!("{}", serde_json::to_string_pretty(contacts)?);
    } else {
        println!("Emergency number: {}", config.emergency.number);
        println!();
        for contact in contacts {
            println!(
                "{:<10} {:>6}  {} ({})",
                contact.id, contact.number, contact.name, contact.description
            );
        }
    }
    Ok(())
}

fn handle_validate(registry: &GuideRegistry) -> anyhow::Result<()> {
    for issue in registry.issues() {
        println!("{issue}");
    }
    registry.validate()?;
    println!("All {} guides are valid.", registry.guides().len());
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Emergency]");
                println!("  Number:             {}", config.emergency.number);
                println!("  Call timeout (s):   {}", config.emergency.call_timeout_secs);
                println!("  Contacts:           {}", config.emergency.contacts.len());
                println!();
                println!("[Narration]");
                println!("  Enabled:            {}", config.narration.enabled);
                println!("  Language:           {}", config.narration.language);
                println!("  Pitch:              {}", config.narration.pitch);
                println!("  Rate:               {}", config.narration.rate);
                println!();
                println!("[Platform]");
                println!("  Backends:           {}", platform::platform_name());
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
