use clap::{Parser, Subcommand};
use dashgate_cli::admin;
use dashgate_models::AppRole;
use dialoguer::{Input, Password};
use dotenvy::dotenv;

#[derive(Parser)]
#[command(name = "dashgate-cli")]
#[command(about = "Dashgate CLI - Administrative tools for Dashgate", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an admin_master account
    CreateAdminMaster {
        /// First name
        #[arg(short = 'f', long)]
        first_name: Option<String>,

        /// Last name
        #[arg(short = 'l', long)]
        last_name: Option<String>,

        /// Email address
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Change the role of an existing user
    SetRole {
        /// Email address of the user
        #[arg(short = 'e', long)]
        email: String,

        /// admin_master, admin or user
        #[arg(short = 'r', long)]
        role: AppRole,
    },
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .expect("Failed to connect to database");

    let cli = Cli::parse();

    match cli.command {
        Commands::CreateAdminMaster {
            first_name,
            last_name,
            email,
            password,
        } => handle_create_admin_master(&pool, first_name, last_name, email, password).await,
        Commands::SetRole { email, role } => handle_set_role(&pool, &email, role).await,
    }
}

fn prompt(value: Option<String>, label: &str) -> String {
    value.unwrap_or_else(|| {
        Input::new()
            .with_prompt(label)
            .interact_text()
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", label.to_lowercase(), e))
    })
}

async fn handle_create_admin_master(
    pool: &sqlx::postgres::PgPool,
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    password: Option<String>,
) {
    let first_name = prompt(first_name, "First name");
    let last_name = prompt(last_name, "Last name");
    let email = prompt(email, "Email address");

    let password = password.unwrap_or_else(|| {
        Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()
            .expect("Failed to read password")
    });

    match admin::create_admin_master(pool, &first_name, &last_name, &email, &password).await {
        Ok(_) => {
            println!("\n✅ Admin master created successfully!");
            println!("   Email: {}", email.trim().to_lowercase());
            println!("   Name: {} {}", first_name, last_name);
        }
        Err(e) => {
            eprintln!("\n❌ Error creating admin master: {:#}", e);
            std::process::exit(1);
        }
    }
}

async fn handle_set_role(pool: &sqlx::postgres::PgPool, email: &str, role: AppRole) {
    match admin::set_role(pool, email, role).await {
        Ok(_) => println!("✅ {} is now {}", email, role),
        Err(e) => {
            eprintln!("\n❌ Error setting role: {:#}", e);
            std::process::exit(1);
        }
    }
}
