use clap::Parser;
use sequence_dispatch::adapters::brevo::BrevoClient;
use sequence_dispatch::adapters::csv_recipients::sample_csv;
use sequence_dispatch::adapters::generator::{ProductRef, SequenceGenerator};
use sequence_dispatch::adapters::products::{Product, ProductClient};
use sequence_dispatch::app::commands::{self, RecipientSource};
use sequence_dispatch::config::provider::{GeneratorConfig, ProviderConfig};
use sequence_dispatch::config::toml_config::TomlConfig;
use sequence_dispatch::config::{Command, ProductCommand};
use sequence_dispatch::core::dispatcher::CampaignDispatcher;
use sequence_dispatch::core::drafts::DraftStore;
use sequence_dispatch::domain::model::{Campaign, Sender};
use sequence_dispatch::utils::error::{DispatchError, ErrorSeverity, Result};
use sequence_dispatch::utils::{logger, validation::Validate};
use sequence_dispatch::{CliConfig, LocalStorage};
use std::path::Path;

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting sequence-dispatch CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = run(config).await {
        tracing::error!("❌ {} (Severity: {:?})", e, e.severity());
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e);
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };

        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

async fn run(config: CliConfig) -> Result<()> {
    let file_config = match &config.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            let loaded = TomlConfig::from_file(path)?;
            loaded.validate()?;
            Some(loaded)
        }
        None => None,
    };

    let draft_path = config
        .draft
        .clone()
        .or_else(|| file_config.as_ref().and_then(|c| c.draft_file().map(str::to_string)))
        .unwrap_or_else(|| CliConfig::DEFAULT_DRAFT.to_string());
    let drafts = DraftStore::new(LocalStorage::new(config.workspace.clone()), draft_path);

    match config.command {
        Command::Generate {
            email,
            csv,
            product_id,
            product_description,
        } => {
            let product = ProductRef::from_parts(product_id, product_description)?;
            let source = match (email, csv) {
                (Some(email), _) => RecipientSource::Single(email),
                (None, Some(path)) => RecipientSource::Csv {
                    data: tokio::fs::read(&path).await?,
                    file_name: Path::new(&path)
                        .file_name()
                        .and_then(|name| name.to_str())
                        .unwrap_or("recipients.csv")
                        .to_string(),
                },
                (None, None) => {
                    return Err(DispatchError::validation(
                        "Enter an email address or upload a CSV file",
                    ))
                }
            };

            let generator = SequenceGenerator::new(generator_config(file_config.as_ref())?)?;
            let draft = commands::generate(&generator, &drafts, source, &product).await?;

            println!(
                "✅ Draft {} now holds {} recipients ({} emails)",
                drafts.path(),
                draft.recipients.len(),
                draft.total_present_slots()
            );
        }
        Command::Edit {
            email,
            slot,
            subject,
            body,
        } => {
            commands::edit(&drafts, &email, slot, subject.as_deref(), body.as_deref()).await?;
            println!("✅ Email {} for {} updated", slot, email);
        }
        Command::Show { email } => {
            let draft = drafts.load().await?;
            for recipient in &draft.recipients {
                if email.as_ref().is_some_and(|e| e != &recipient.email) {
                    continue;
                }
                println!("📧 {}", recipient.email);
                for slot in recipient.sequence.present() {
                    println!("  [{}] {}", slot.index, slot.subject);
                }
            }
        }
        Command::Dispatch {
            sender_name,
            sender_email,
            campaign,
            report_dir,
        } => {
            let provider_config = match &file_config {
                Some(c) => c.provider_config(),
                None => ProviderConfig::from_env()?,
            };
            provider_config.validate()?;

            let report_dir =
                report_dir.or_else(|| file_config.as_ref().and_then(|c| c.report_dir().map(str::to_string)));

            let dispatcher = CampaignDispatcher::new(BrevoClient::new(provider_config)?);
            let report = commands::dispatch(
                &dispatcher,
                &drafts,
                &Sender::new(sender_name, sender_email),
                &Campaign::new(campaign),
                report_dir.as_deref(),
            )
            .await?;

            println!(
                "✅ Campaign '{}': {} sent, {} failed ({} total)",
                report.summary.campaign_name,
                report.summary.successful,
                report.summary.failed,
                report.summary.total_emails
            );
            for failed in report.results.iter().filter(|r| !r.success) {
                println!(
                    "❌ {} email {}: {}",
                    failed.email,
                    failed.email_number,
                    failed.error.as_deref().unwrap_or_default()
                );
            }
        }
        Command::Products { action } => {
            let config = generator_config(file_config.as_ref())?;
            let user_id = config.user_id.clone();
            let client = ProductClient::new(config)?;

            match action {
                ProductCommand::List { user_id: requested } => {
                    let user_id = requested.or(user_id).ok_or_else(|| {
                        DispatchError::validation(
                            "A user id is required: pass --user-id or set GENERATOR_USER_ID",
                        )
                    })?;
                    let products = client.list_products(&user_id).await?;
                    if products.is_empty() {
                        println!("📭 No products yet");
                    }
                    for product in &products {
                        println!("📦 {}  {}", product.id, product.product_name);
                    }
                }
                ProductCommand::Show { id } => {
                    print_product(&client.get_product(&id).await?);
                }
                ProductCommand::Create { name, description } => {
                    let product = client.create_product(&name, &description).await?;
                    println!("✅ Product created");
                    print_product(&product);
                }
                ProductCommand::Update {
                    id,
                    name,
                    description,
                } => {
                    let product = client.update_product(&id, &name, &description).await?;
                    println!("✅ Product updated");
                    print_product(&product);
                }
            }
        }
        Command::SampleCsv => {
            print!("{}", sample_csv());
        }
    }

    Ok(())
}

fn generator_config(file_config: Option<&TomlConfig>) -> Result<GeneratorConfig> {
    let config = match file_config {
        Some(c) => c.generator_config(),
        None => GeneratorConfig::from_env(),
    };
    config.validate()?;
    Ok(config)
}

fn print_product(product: &Product) {
    println!("📦 {}  {}", product.id, product.product_name);
    println!("{}", product.product_description);
}
