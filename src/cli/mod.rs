use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::application::HierarchyService;
use crate::domain::{format_cents, parse_cents, NewExpense, Principal};

/// Dispendio - ownership-scoped expense tracker
///
/// The CLI is a stand-in transport: it builds the principal from `--user`,
/// hands every request to the service, and renders the result. It contains
/// no authorization or hierarchy logic of its own.
#[derive(Parser)]
#[command(name = "dispendio")]
#[command(about = "Track tagged expenses across per-user accounts and wallets")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, default_value = "dispendio.db")]
    pub database: String,

    /// Acting identity. Omit to run as the anonymous principal.
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Account management commands
    #[command(subcommand)]
    Account(AccountCommands),

    /// Wallet management commands
    #[command(subcommand)]
    Wallet(WalletCommands),

    /// Expense management commands
    #[command(subcommand)]
    Expense(ExpenseCommands),

    /// Tag administration (global reference data)
    #[command(subcommand)]
    Tag(TagCommands),

    /// Expense category administration (global reference data)
    #[command(subcommand)]
    Category(CategoryCommands),
}

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Create a new account owned by the acting user
    Create {
        /// Account name
        name: String,

        /// Free-form description
        #[arg(short = 'D', long)]
        description: Option<String>,
    },

    /// List the acting user's accounts
    List,

    /// Show an account and its wallets
    Show {
        /// Account id
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum WalletCommands {
    /// Create a wallet under an account
    Create {
        /// Owning account id
        #[arg(short, long)]
        account: i64,

        /// Wallet name
        name: String,

        /// Tag ids to attach (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<i64>,
    },

    /// Show a wallet, its expenses and the running total
    Show {
        /// Owning account id
        #[arg(short, long)]
        account: i64,

        /// Wallet id
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// Add an expense to a wallet
    Add {
        /// Owning account id
        #[arg(short, long)]
        account: i64,

        /// Wallet id
        #[arg(short, long)]
        wallet: i64,

        /// Expense category id
        #[arg(short, long)]
        category: i64,

        /// Expense name
        name: String,

        /// Amount (e.g. "1000.22")
        amount: String,

        /// Free-form description
        #[arg(short = 'D', long)]
        description: Option<String>,

        /// Pin this expense to the top of the wallet
        #[arg(long)]
        pin: bool,

        /// Tag ids to attach (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<i64>,
    },

    /// Delete an expense by id
    Delete {
        /// Owning account id
        #[arg(short, long)]
        account: i64,

        /// Wallet id
        #[arg(short, long)]
        wallet: i64,

        /// Expense id
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum TagCommands {
    /// Create a tag
    Add { name: String },

    /// List all tags
    List,
}

#[derive(Subcommand)]
pub enum CategoryCommands {
    /// Create an expense category
    Add { name: String },

    /// List all categories
    List,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let principal = match &self.user {
            Some(id) => Principal::user(id.clone()),
            None => Principal::Anonymous,
        };

        let service = match self.command {
            Commands::Init => {
                HierarchyService::init(&self.database).await?;
                println!("Initialized database at {}", self.database);
                return Ok(());
            }
            _ => HierarchyService::connect(&self.database).await?,
        };

        match self.command {
            Commands::Init => return Ok(()),

            Commands::Account(cmd) => match cmd {
                AccountCommands::Create { name, description } => {
                    let account = service
                        .create_account(&principal, &name, description.as_deref())
                        .await?;
                    if self.json {
                        println!("{}", serde_json::to_string_pretty(&account)?);
                    } else {
                        println!("Created account {} ({})", account.name, account.id);
                    }
                }
                AccountCommands::List => {
                    let accounts = service.list_accounts(&principal).await?;
                    if self.json {
                        println!("{}", serde_json::to_string_pretty(&accounts)?);
                    } else if accounts.is_empty() {
                        println!("No accounts.");
                    } else {
                        for account in accounts {
                            println!(
                                "{:>4}  {}  {}",
                                account.id,
                                account.name,
                                account.description.as_deref().unwrap_or("")
                            );
                        }
                    }
                }
                AccountCommands::Show { id } => {
                    let view = service.get_account(&principal, id).await?;
                    if self.json {
                        println!("{}", serde_json::to_string_pretty(&view)?);
                    } else {
                        println!("Account {} ({})", view.account.name, view.account.id);
                        if let Some(desc) = &view.account.description {
                            println!("  {}", desc);
                        }
                        println!("Wallets:");
                        for wallet in view.wallets {
                            println!(
                                "{:>4}  {}  [{}]",
                                wallet.id,
                                wallet.name,
                                tag_names(&wallet.tags)
                            );
                        }
                    }
                }
            },

            Commands::Wallet(cmd) => match cmd {
                WalletCommands::Create {
                    account,
                    name,
                    tags,
                } => {
                    let wallet = service
                        .create_wallet(&principal, account, &name, &tags)
                        .await?;
                    if self.json {
                        println!("{}", serde_json::to_string_pretty(&wallet)?);
                    } else {
                        println!("Created wallet {} ({})", wallet.name, wallet.id);
                    }
                }
                WalletCommands::Show { account, id } => {
                    let view = service.get_wallet(&principal, account, id).await?;
                    if self.json {
                        println!("{}", serde_json::to_string_pretty(&view)?);
                    } else {
                        println!("Wallet {} ({})", view.wallet.name, view.wallet.id);
                        for expense in &view.expenses {
                            println!(
                                "{:>4}  {}{}  {:>10}  [{}]",
                                expense.id,
                                if expense.pinned { "* " } else { "" },
                                expense.name,
                                format_cents(expense.amount_cents),
                                tag_names(&expense.tags)
                            );
                        }
                        println!(
                            "Total: {} across {} expense(s)",
                            format_cents(view.total_cents),
                            view.expense_count
                        );
                    }
                }
            },

            Commands::Expense(cmd) => match cmd {
                ExpenseCommands::Add {
                    account,
                    wallet,
                    category,
                    name,
                    amount,
                    description,
                    pin,
                    tags,
                } => {
                    let amount_cents = parse_cents(&amount)
                        .with_context(|| format!("Invalid amount: {}", amount))?;
                    let mut new = NewExpense::new(category, name, amount_cents)
                        .pinned(pin)
                        .with_tags(tags);
                    if let Some(desc) = description {
                        new = new.with_description(desc);
                    }
                    let expense = service
                        .create_expense(&principal, account, wallet, new)
                        .await?;
                    if self.json {
                        println!("{}", serde_json::to_string_pretty(&expense)?);
                    } else {
                        println!(
                            "Added expense {} ({}) for {}",
                            expense.name,
                            expense.id,
                            format_cents(expense.amount_cents)
                        );
                    }
                }
                ExpenseCommands::Delete {
                    account,
                    wallet,
                    id,
                } => {
                    service
                        .delete_expense(&principal, account, wallet, id)
                        .await?;
                    println!("Deleted expense {}", id);
                }
            },

            Commands::Tag(cmd) => match cmd {
                TagCommands::Add { name } => {
                    let tag = service.refdata().create_tag(&name).await?;
                    println!("Created tag {} ({})", tag.name, tag.id);
                }
                TagCommands::List => {
                    let tags = service.refdata().list_tags().await?;
                    if self.json {
                        println!("{}", serde_json::to_string_pretty(&tags)?);
                    } else {
                        for tag in tags {
                            println!("{:>4}  {}", tag.id, tag.name);
                        }
                    }
                }
            },

            Commands::Category(cmd) => match cmd {
                CategoryCommands::Add { name } => {
                    let category = service.refdata().create_category(&name).await?;
                    println!("Created category {} ({})", category.name, category.id);
                }
                CategoryCommands::List => {
                    let categories = service.refdata().list_categories().await?;
                    if self.json {
                        println!("{}", serde_json::to_string_pretty(&categories)?);
                    } else {
                        for category in categories {
                            println!("{:>4}  {}", category.id, category.name);
                        }
                    }
                }
            },
        }

        Ok(())
    }
}

fn tag_names(tags: &[crate::domain::Tag]) -> String {
    tags.iter()
        .map(|t| t.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
