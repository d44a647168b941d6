//! Subcommands.

use std::sync::Arc;
use std::time::Duration;

use clap::Subcommand;

use brawl_application::{
    ApplicationError, ApplicationResult, AuthService, Bootstrapper, Clock, RuntimeContext,
    ServiceContext, SignInScreen,
};
use brawl_domain::{
    Timestamp, format_datetime, format_debate_result, format_timestamp, get_error_redirect,
    get_status_redirect, get_url,
};
use brawl_infrastructure::{AppConfig, BackendServiceFactory, ReqwestApiClient, SystemClock};

use crate::console::{ConsoleNavigator, ConsoleNotifier, StdinConsent};

/// How long `sign-in` waits for the session watch to navigate.
const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the absolute site URL for a path
    Url {
        /// Path on the site
        #[arg(default_value = "")]
        path: String,
    },

    /// Create an account and its user profile
    Register {
        /// Email address
        #[arg(long)]
        email: String,
        /// Password
        #[arg(long)]
        password: String,
        /// Full name
        #[arg(long)]
        name: String,
        /// Public username
        #[arg(long)]
        username: String,
    },

    /// Sign in with email and password
    Login {
        /// Email address
        #[arg(long)]
        email: String,
        /// Password
        #[arg(long)]
        password: String,
    },

    /// Sign out
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Check whether a user may start another free debate
    CanDebate {
        /// User id
        uid: String,
    },

    /// Build a redirect URL carrying a toast message
    Redirect {
        /// Toast kind
        #[command(subcommand)]
        kind: RedirectKind,
    },

    /// Print the Unix time at which a trial started now ends
    TrialEnd {
        /// Trial length in days
        days: i64,
    },

    /// Format a Unix timestamp for display
    Date {
        /// Seconds since the Unix epoch
        #[arg(allow_negative_numbers = true)]
        seconds: i64,
    },

    /// Print the display label of a debate result
    DebateResult {
        /// Raw result (win, loss, draw, ongoing)
        result: String,
    },

    /// POST to a site API route and print the JSON response
    Post {
        /// Absolute URL or path on the site
        url: String,
    },

    /// Run the interactive sign-in screen
    SignIn {
        /// Path to open after sign-in
        #[arg(long)]
        redirect: Option<String>,
    },
}

/// Arguments shared by both redirect kinds.
#[derive(Debug, clap::Args)]
pub struct RedirectArgs {
    /// Target path
    path: String,
    /// Toast title
    name: String,
    /// Toast description
    #[arg(long, default_value = "")]
    description: String,
    /// Disable the submit button on the target page
    #[arg(long)]
    disable_button: bool,
    /// Extra query string appended verbatim
    #[arg(long, default_value = "")]
    extra: String,
}

/// Toast kinds for `redirect`.
#[derive(Debug, Subcommand)]
pub enum RedirectKind {
    /// Status (success) toast
    Status(RedirectArgs),
    /// Error toast
    Error(RedirectArgs),
}

impl Commands {
    /// Runs the command.
    ///
    /// # Errors
    ///
    /// Returns the failure of the underlying operation.
    pub async fn execute(
        self,
        config: AppConfig,
        bootstrapper: &Bootstrapper,
    ) -> ApplicationResult<()> {
        match self {
            Self::Url { path } => println!("{}", get_url(&config.urls(), &path)),
            Self::Redirect { kind } => println!("{}", redirect(&kind)),
            Self::TrialEnd { days } => match SystemClock::new().trial_end(Some(days)) {
                Some(end) => println!("{end}"),
                None => println!("none"),
            },
            Self::Date { seconds } => {
                let timestamp = Timestamp::new(seconds, 0)?;
                println!("{}", format_timestamp(&timestamp));
                println!("{}", format_datetime(&timestamp));
            }
            Self::DebateResult { result } => println!("{}", format_debate_result(&result)),
            Self::Post { url } => {
                let client = ReqwestApiClient::new(config.urls())
                    .map_err(|e| ApplicationError::Http(e.to_string()))?;
                let value = client
                    .post_data(&url)
                    .await
                    .map_err(|e| ApplicationError::Http(e.to_string()))?;
                println!(
                    "{}",
                    serde_json::to_string_pretty(&value)
                        .map_err(|e| ApplicationError::Internal(e.to_string()))?
                );
            }
            command => {
                let context = services(config, bootstrapper).await?;
                command.execute_with(&context).await?;
            }
        }
        Ok(())
    }

    async fn execute_with(self, context: &ServiceContext) -> ApplicationResult<()> {
        let auth = AuthService::from_context(context, Arc::new(SystemClock::new()));
        match self {
            Self::Register {
                email,
                password,
                name,
                username,
            } => {
                let session = auth.register(&email, &password, &name, &username).await?;
                println!("{}", session.uid);
            }
            Self::Login { email, password } => {
                let session = auth.login(&email, &password).await?;
                println!("{}", session.uid);
            }
            Self::Logout => auth.logout().await?,
            Self::Whoami => match auth.current_user() {
                Some(user) => println!(
                    "{} {}",
                    user.uid,
                    user.email.as_deref().unwrap_or("(no email)")
                ),
                None => println!("not signed in"),
            },
            Self::CanDebate { uid } => println!("{}", auth.can_start_new_debate(&uid).await),
            Self::SignIn { redirect } => sign_in(context, redirect.as_deref()).await?,
            _ => {}
        }
        Ok(())
    }
}

async fn services(
    config: AppConfig,
    bootstrapper: &Bootstrapper,
) -> ApplicationResult<ServiceContext> {
    let factory = BackendServiceFactory::new(config)?.with_consent(Arc::new(StdinConsent));
    bootstrapper
        .get_or_init(RuntimeContext::Interactive, &factory)
        .await?
        .ok_or(ApplicationError::ServicesUnavailable)
}

fn redirect(kind: &RedirectKind) -> String {
    match kind {
        RedirectKind::Status(args) => get_status_redirect(
            &args.path,
            &args.name,
            &args.description,
            args.disable_button,
            &args.extra,
        ),
        RedirectKind::Error(args) => get_error_redirect(
            &args.path,
            &args.name,
            &args.description,
            args.disable_button,
            &args.extra,
        ),
    }
}

async fn sign_in(context: &ServiceContext, redirect: Option<&str>) -> ApplicationResult<()> {
    let query = redirect.map_or_else(String::new, |target| url_query("redirect", target));
    let navigator = Arc::new(ConsoleNavigator::default());
    let screen = Arc::new(SignInScreen::new(
        context.identity(),
        navigator.clone(),
        Arc::new(ConsoleNotifier),
        &query,
    ));

    let watch = screen.mount();
    let unsubscribe = watch.unsubscribe_handle();
    let runner = {
        let screen = screen.clone();
        tokio::spawn(async move { screen.run(watch).await })
    };

    // A user who is already signed in is redirected without a prompt.
    let proceed = context.identity().current_session().is_some() || {
        eprintln!("{}", screen.view().title);
        screen.sign_in().await
    };
    if proceed
        && tokio::time::timeout(NAVIGATION_TIMEOUT, navigator.navigated())
            .await
            .is_err()
    {
        tracing::warn!("signed in but no navigation happened");
    }

    unsubscribe.unsubscribe();
    runner
        .await
        .map_err(|e| ApplicationError::Internal(e.to_string()))?;
    Ok(())
}

fn url_query(key: &str, value: &str) -> String {
    format!("{key}={}", brawl_domain::encode_uri_component(value))
}
