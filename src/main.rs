use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hirelink::api::ApiClient;
use hirelink::config::AppConfig;
use hirelink::mock::{self, MockState};
use hirelink::models::LoginRequest;
use hirelink::policy::{ActionInput, BookingAction};
use hirelink::session::{Session, SqliteCredentialStore};
use hirelink::views::{
    BookingDetailView, BookingListView, HomeView, Notification, ServiceCard, ServiceDetailView,
    StatusFilter, ViewContext,
};

/// hirelink - home services marketplace client
#[derive(Parser, Debug)]
#[command(name = "hirelink")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Backend base URL (overrides HIRELINK_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in with email or phone
    Login {
        /// Email address or phone number
        login: String,

        #[arg(short, long)]
        password: String,
    },

    /// Forget the stored credentials
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Categories, featured providers and recent bookings
    Home,

    /// Show a service
    Service { id: i64 },

    /// List your bookings
    Bookings {
        /// all, pending, confirmed, in-progress, completed, cancelled
        #[arg(short, long, default_value = "all")]
        status: String,

        #[arg(long, default_value = "0")]
        page: u32,
    },

    /// Show one booking and the actions available on it
    Booking { id: i64 },

    /// Run an action on a booking (accept, reject, confirm, start, complete, cancel)
    Act {
        id: i64,

        action: String,

        /// Reason for rejecting or cancelling
        #[arg(long)]
        reason: Option<String>,

        /// Notes attached when accepting or confirming
        #[arg(long)]
        notes: Option<String>,

        /// Summary of the work done, when completing
        #[arg(long)]
        summary: Option<String>,

        /// Final amount charged, when completing
        #[arg(long)]
        amount: Option<f64>,
    },

    /// Review a completed booking
    Review {
        id: i64,

        /// Star rating, 1 to 5
        #[arg(short, long, default_value = "5")]
        rating: u8,

        #[arg(short, long)]
        text: Option<String>,
    },

    /// Run the local mock backend
    MockServer {
        #[arg(long)]
        port: Option<u16>,
    },
}

fn connect(config: &AppConfig) -> anyhow::Result<ViewContext> {
    let store = SqliteCredentialStore::open(&config.session_db)
        .with_context(|| format!("failed to open session store at {}", config.session_db))?;
    let session = Session::new(Box::new(store))?;
    let client = ApiClient::new(config.api_url.clone(), Arc::new(session));
    Ok(ViewContext::new(Arc::new(client)))
}

fn report(notice: &Notification) -> anyhow::Result<()> {
    println!("{notice}");
    if !notice.is_success() {
        bail!("{}", notice.message);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env();
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }

    match cli.command {
        Commands::MockServer { port } => {
            let addr = SocketAddr::from(([127, 0, 0, 1], port.unwrap_or(config.mock_port)));
            mock::serve(addr, Arc::new(MockState::seeded())).await?;
        }

        Commands::Login { login, password } => {
            let ctx = connect(&config)?;
            let body = if login.contains('@') {
                LoginRequest {
                    email: Some(login),
                    password,
                    ..LoginRequest::default()
                }
            } else {
                LoginRequest {
                    phone: Some(login),
                    password,
                    ..LoginRequest::default()
                }
            };
            let auth = ctx.client.login(&body).await?;
            match auth.user {
                Some(user) => println!("Signed in as {} ({})", user.name, user.user_type),
                None => println!("Signed in"),
            }
        }

        Commands::Logout => {
            connect(&config)?.client.logout()?;
            println!("Signed out");
        }

        Commands::Whoami => match connect(&config)?.client.session().viewer() {
            Some(viewer) => println!("{} (#{}, {})", viewer.name, viewer.user_id, viewer.role),
            None => println!("Not signed in"),
        },

        Commands::Home => {
            let feed = HomeView::new(connect(&config)?).load().await?;
            print!("{feed}");
        }

        Commands::Service { id } => {
            let service = ServiceDetailView::new(connect(&config)?, id).load().await?;
            print!("{}", ServiceCard(&service));
        }

        Commands::Bookings { status, page } => {
            let Some(filter) = StatusFilter::parse(&status) else {
                bail!("unknown status filter: {status}");
            };
            let list = BookingListView::new(connect(&config)?).load(filter, page).await?;
            print!("{list}");
        }

        Commands::Booking { id } => {
            let detail = BookingDetailView::new(connect(&config)?, id).load().await?;
            print!("{detail}");
        }

        Commands::Act {
            id,
            action,
            reason,
            notes,
            summary,
            amount,
        } => {
            let action = match BookingAction::parse(&action) {
                Some(BookingAction::Review) => bail!("use `hirelink review` to review a booking"),
                Some(action) => action,
                None => bail!("unknown action: {action}"),
            };
            let input = ActionInput {
                reason,
                notes,
                work_summary: summary,
                final_amount: amount,
                ..ActionInput::default()
            };
            let outcome = BookingDetailView::new(connect(&config)?, id)
                .perform(action, input)
                .await;
            report(&outcome.notification)?;
            if let Some(detail) = outcome.refreshed {
                print!("\n{detail}");
            }
        }

        Commands::Review { id, rating, text } => {
            let outcome = BookingDetailView::new(connect(&config)?, id)
                .submit_review(rating, text)
                .await;
            report(&outcome.notification)?;
        }
    }

    Ok(())
}
