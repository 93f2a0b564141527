use anyhow::Error;
use orchid_client::{
    endpoints::{self, EndpointError},
    Credentials, FileStore, OrderRequest, PaymentCallback, SessionManager,
    Storage,
};
use reqwest::Client;
use std::path::PathBuf;
use structopt::StructOpt;
use url::Url;

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    let args = Args::from_args();

    log::debug!("Starting with {:#?}", args);

    let Args {
        host,
        employees_url,
        cache_dir,
        cmd,
    } = args;

    let client = Client::builder()
        .user_agent(orchid_client::DEFAULT_USER_AGENT)
        .cookie_store(true)
        .build()?;

    let store = FileStore::new(&cache_dir);
    let mut session = SessionManager::initialize(store);

    match cmd {
        Command::Login {
            account_name,
            password,
        } => {
            let credentials = Credentials {
                account_name,
                password,
            };
            let outcome =
                session.login(&client, &host, &credentials).await?;

            match outcome.role {
                Some(role) => println!("Logged in with the {} role", role),
                None => println!("Logged in"),
            }
            if let Some(message) = outcome.response.message {
                println!("{}", message);
            }
        },
        Command::Register {
            account_name,
            email,
            password,
        } => {
            let message = endpoints::register(
                &client,
                &host,
                &account_name,
                &email,
                &password,
            )
            .await?;
            println!("{}", message);
        },
        Command::Logout => {
            session.logout()?;
            println!("Logged out");
        },
        Command::Whoami => {
            let view = session.session();
            if !view.is_authenticated {
                println!("Not logged in");
            } else {
                let name = view
                    .user
                    .as_ref()
                    .and_then(|u| {
                        u.user_name
                            .as_deref()
                            .or_else(|| u.account_name.as_deref())
                    })
                    .unwrap_or("<unknown>");
                println!("Logged in as {}", name);
                match view.role {
                    Some(role) => println!("Role: {}", role),
                    None => println!("Role: none"),
                }
                if !session.has_valid_token() {
                    println!("The token has expired; log in again");
                }
            }
        },
        Command::Orchids { cmd } => {
            orchids(cmd, &client, &host, &mut session).await?
        },
        Command::Categories => {
            let token = session.token();
            let categories = recover(
                &mut session,
                endpoints::get_all_categories(
                    &client,
                    &host,
                    token.as_deref(),
                )
                .await,
            )?;

            for category in categories {
                println!(
                    "{:>4}  {}",
                    category.category_id, category.category_name
                );
            }
        },
        Command::Orders { cmd } => {
            orders(cmd, &client, &host, &mut session).await?
        },
        Command::Payment { cmd } => {
            payment(cmd, &client, &host, &mut session).await?
        },
        Command::Employees => {
            let roster =
                endpoints::get_employees_or_fallback(&client, &employees_url)
                    .await;

            if roster.from_fallback {
                println!("(employees service unreachable, showing the built-in roster)");
            }
            for employee in roster.employees {
                println!(
                    "{:>6}  {:<20} {}",
                    employee.emp_id, employee.name, employee.designation
                );
            }
        },
    }

    Ok(())
}

async fn orchids<S: Storage>(
    cmd: OrchidCommand,
    client: &Client,
    host: &str,
    session: &mut SessionManager<S>,
) -> Result<(), Error> {
    let token = session.token();
    let token = token.as_deref();

    match cmd {
        OrchidCommand::List => {
            let orchids = recover(
                session,
                endpoints::get_all_orchids(client, host, token).await,
            )?;
            for orchid in orchids {
                println!(
                    "{:>4}  {:<30} {:>10.2}  {}",
                    orchid.orchid_id,
                    orchid.orchid_name,
                    orchid.price,
                    if orchid.is_natural { "natural" } else { "industry" },
                );
            }
        },
        OrchidCommand::Show { id } => {
            let orchid = recover(
                session,
                endpoints::get_orchid_by_id(client, host, token, id)
                    .await,
            )?;
            println!("{:#?}", orchid);
        },
        OrchidCommand::Search { name } => {
            let orchids = recover(
                session,
                endpoints::search_orchids_by_name(
                    client, host, token, &name,
                )
                .await,
            )?;
            for orchid in orchids {
                println!("{:>4}  {}", orchid.orchid_id, orchid.orchid_name);
            }
        },
        OrchidCommand::Delete { id } => {
            recover(
                session,
                endpoints::delete_orchid(client, host, token, id)
                    .await,
            )?;
            println!("Deleted orchid {}", id);
        },
    }

    Ok(())
}

async fn orders<S: Storage>(
    cmd: OrderCommand,
    client: &Client,
    host: &str,
    session: &mut SessionManager<S>,
) -> Result<(), Error> {
    let token = session.token();
    let token = token.as_deref();

    match cmd {
        OrderCommand::List { all } => {
            let orders = if all {
                recover(
                    session,
                    endpoints::get_all_orders(client, host, token)
                        .await,
                )?
            } else {
                recover(
                    session,
                    endpoints::get_my_orders(client, host, token)
                        .await,
                )?
            };

            for order in orders {
                println!(
                    "{:>4}  {:<10} {:>10.2}",
                    order.order_id,
                    order.order_status.to_string(),
                    order.total_amount,
                );
            }
        },
        OrderCommand::Create {
            orchid_id,
            quantity,
            price,
        } => {
            let order = OrderRequest {
                price,
                quantity,
                orchid_id,
            };
            let message = recover(
                session,
                endpoints::create_order(client, host, token, &order)
                    .await,
            )?;
            println!("{}", message);
        },
        OrderCommand::Details { order_id } => {
            let details = recover(
                session,
                endpoints::order_details_by_order(
                    client, host, token, order_id,
                )
                .await,
            )?;
            for detail in details {
                println!(
                    "{:<30} x{:<4} {:>10.2}",
                    detail.orchid_name, detail.quantity, detail.price,
                );
            }
        },
    }

    Ok(())
}

async fn payment<S: Storage>(
    cmd: PaymentCommand,
    client: &Client,
    host: &str,
    session: &mut SessionManager<S>,
) -> Result<(), Error> {
    let token = session.token();
    let token = token.as_deref();

    match cmd {
        PaymentCommand::Url { order_id } => {
            let url = recover(
                session,
                endpoints::create_payment_url(
                    client, host, token, order_id,
                )
                .await,
            )?;
            println!("{}", url);
        },
        PaymentCommand::Callback { url } => {
            let callback = PaymentCallback::from_url(&url)?;

            if callback.is_success() {
                println!("Payment successful: {}", callback.display_message());
            } else {
                println!("Payment failed: {}", callback.display_message());
            }

            let message = recover(
                session,
                endpoints::handle_payment(
                    client,
                    host,
                    token,
                    &callback.to_payload(),
                )
                .await,
            )?;
            println!("{}", message);

            if callback.is_success() {
                println!("Check `orders list` for the updated order");
            }
        },
    }

    Ok(())
}

/// A 401 means the stored token is dead; drop it so the next run starts
/// clean, then tell the user.
fn recover<S: Storage, T>(
    session: &mut SessionManager<S>,
    result: Result<T, EndpointError>,
) -> Result<T, Error> {
    match result {
        Err(EndpointError::SessionExpired) => {
            if let Err(e) = session.logout() {
                log::warn!("Unable to clear the stale session: {}", e);
            }
            Err(Error::msg("The session has expired, please log in again"))
        },
        other => other.map_err(Error::from),
    }
}

#[derive(Debug, StructOpt)]
struct Args {
    #[structopt(
        long = "host",
        default_value = "http://localhost:8080",
        help = "The store backend's base URL"
    )]
    host: String,
    #[structopt(
        long = "employees-url",
        default_value = "http://localhost:3001/employees",
        help = "The employees service's base URL"
    )]
    employees_url: String,
    #[structopt(
        long = "cache-dir",
        default_value = ".orchid-client",
        help = "Where the session is kept between runs"
    )]
    cache_dir: PathBuf,
    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    /// Log in and persist the session.
    Login {
        #[structopt(short = "u", long = "username")]
        account_name: String,
        #[structopt(short = "p", long = "password")]
        password: String,
    },
    /// Create a new account.
    Register {
        #[structopt(short = "u", long = "username")]
        account_name: String,
        #[structopt(short = "e", long = "email")]
        email: String,
        #[structopt(short = "p", long = "password")]
        password: String,
    },
    /// Drop the persisted session.
    Logout,
    /// Show who is currently logged in.
    Whoami,
    /// Browse and manage the catalogue.
    Orchids {
        #[structopt(subcommand)]
        cmd: OrchidCommand,
    },
    /// List the categories.
    Categories,
    /// List your orders, or place one.
    Orders {
        #[structopt(subcommand)]
        cmd: OrderCommand,
    },
    /// Checkout URLs and gateway callbacks.
    Payment {
        #[structopt(subcommand)]
        cmd: PaymentCommand,
    },
    /// List the staff roster.
    Employees,
}

#[derive(Debug, StructOpt)]
enum OrchidCommand {
    List,
    Show {
        id: i64,
    },
    Search {
        name: String,
    },
    Delete {
        id: i64,
    },
}

#[derive(Debug, StructOpt)]
enum OrderCommand {
    List {
        /// Every order in the store, not just yours (admin only).
        #[structopt(long = "all")]
        all: bool,
    },
    Create {
        #[structopt(long = "orchid")]
        orchid_id: i64,
        #[structopt(long = "quantity", default_value = "1")]
        quantity: i32,
        #[structopt(long = "price")]
        price: f64,
    },
    Details {
        order_id: i64,
    },
}

#[derive(Debug, StructOpt)]
enum PaymentCommand {
    /// Get a checkout URL for an order.
    Url {
        order_id: i64,
    },
    /// Process the URL the gateway redirected you back to.
    Callback {
        url: Url,
    },
}
