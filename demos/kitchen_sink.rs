use anyhow::Error;
use orchid_client::{endpoints, Credentials, MemoryStore, SessionManager};
use reqwest::Client;
use structopt::StructOpt;

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    let args = Args::from_args();

    log::debug!("Starting with {:#?}", args);

    // Create a HTTP client, remembering cookies in case the backend ever
    // starts setting them
    let client = Client::builder()
        .user_agent(orchid_client::DEFAULT_USER_AGENT)
        .cookie_store(true)
        .build()?;

    // A throwaway in-memory session; a real tool would use a FileStore so
    // the login survives the process
    let mut session = SessionManager::initialize(MemoryStore::new());

    let credentials = Credentials {
        account_name: args.username.clone(),
        password: args.password.clone(),
    };
    let outcome = session.login(&client, &args.host, &credentials).await?;

    log::info!(
        "Logged in as {} with role {:?}",
        args.username,
        outcome.role
    );

    let token = session.token();
    let token = token.as_deref();

    // browse the catalogue
    let orchids =
        endpoints::get_all_orchids(&client, &args.host, token).await?;
    log::info!("The catalogue holds {} orchids", orchids.len());

    for orchid in &orchids {
        log::info!(
            "{} ({}) => {:.2}",
            orchid.orchid_name,
            if orchid.is_natural { "natural" } else { "industry" },
            orchid.price,
        );
    }

    // and the categories; an empty store is fine
    let categories =
        endpoints::get_all_categories(&client, &args.host, token).await?;
    for category in &categories {
        log::info!("Category: {}", category.category_name);
    }

    // order the cheapest orchid, if there is one
    let cheapest = orchids.iter().min_by(|a, b| {
        a.price.partial_cmp(&b.price).unwrap_or(std::cmp::Ordering::Equal)
    });

    if let Some(orchid) = cheapest {
        let request = orchid_client::OrderRequest {
            price: orchid.price,
            quantity: 1,
            orchid_id: orchid.orchid_id,
        };
        let message =
            endpoints::create_order(&client, &args.host, token, &request)
                .await?;
        log::info!("{}", message);

        // grab a checkout URL for the newest order
        let orders =
            endpoints::get_my_orders(&client, &args.host, token).await?;
        if let Some(order) = orders.first() {
            let url = endpoints::create_payment_url(
                &client,
                &args.host,
                token,
                order.order_id,
            )
            .await?;
            log::info!("Pay at {}", url);
        }
    }

    log::info!("Logging out");
    session.logout()?;

    Ok(())
}

#[derive(Debug, StructOpt)]
struct Args {
    #[structopt(
        long = "host",
        default_value = "http://localhost:8080",
        help = "The store backend's base URL"
    )]
    host: String,
    #[structopt(short = "u", long = "username", help = "Your account name")]
    username: String,
    #[structopt(short = "p", long = "password", help = "Your password")]
    password: String,
}
