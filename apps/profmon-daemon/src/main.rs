use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use profile_transport::{CommandChannel, MockCommandChannel, MockSubscriber, ProfileSubscriber};
use profmon_service::{
    spawn_profile_request, ProfMonService, ServiceConfig, DEFAULT_MODEL_PORT,
    DEFAULT_PROFILE_PORT,
};
use std::path::PathBuf;
use tracing::{info, warn};
use variable_server::MemoryServer;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Backend {
    /// In-process channels; registers variables and exits
    Mock,
    /// ZeroMQ SUB/REQ sockets
    Zmq,
}

#[cfg(feature = "zmq")]
const DEFAULT_BACKEND: &str = "zmq";
#[cfg(not(feature = "zmq"))]
const DEFAULT_BACKEND: &str = "mock";

#[derive(Parser)]
#[command(name = "profmon-daemon")]
#[command(about = "Simulated profile monitor service")]
struct Args {
    /// Screen configuration file (.dat pickle, .yaml or .json)
    #[arg(long, env = "PROFMON_CONFIG", default_value = "screenProps5.dat")]
    config: PathBuf,

    /// Host running the model
    #[arg(long, env = "PROFMON_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Model control channel port
    #[arg(long, env = "MODEL_PORT", default_value_t = DEFAULT_MODEL_PORT)]
    model_port: u16,

    /// Profile data channel port
    #[arg(long, env = "PROFILE_PORT", default_value_t = DEFAULT_PROFILE_PORT)]
    profile_port: u16,

    /// Transport backend
    #[arg(long, value_enum, default_value = DEFAULT_BACKEND)]
    backend: Backend,

    /// Do not ask the model for profiles at startup
    #[arg(long, action = ArgAction::SetTrue)]
    no_trigger: bool,
}

impl Args {
    fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            config_path: self.config.clone(),
            host: self.host.clone(),
            model_port: self.model_port,
            profile_port: self.profile_port,
            trigger: !self.no_trigger,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    setup_tracing();

    let args = Args::parse();
    let cfg = args.service_config();
    info!(
        config = %serde_json::to_string(&cfg).unwrap_or_default(),
        backend = ?args.backend,
        "profmon-daemon starting"
    );

    let records = device_registry::load_screen_records(&cfg.config_path)?;
    let mut service = ProfMonService::new(&records, MemoryServer::new())
        .context("initializing profile variables")?;

    let (mut sub, cmd) = connect(args.backend, &cfg).await?;
    // Subscribed before the trigger goes out, so the first profiles are not missed.
    if cfg.trigger {
        spawn_profile_request(cmd);
    }

    info!("initialization complete");
    tokio::select! {
        cycles = service.run(sub.as_mut()) => {
            info!(cycles, "ingestion loop ended");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("interrupt received");
        }
    }

    info!(metrics = %service.metrics().encode_text(), "profmon-daemon shutting down");
    Ok(())
}

async fn connect(
    backend: Backend,
    cfg: &ServiceConfig,
) -> Result<(Box<dyn ProfileSubscriber>, Box<dyn CommandChannel>)> {
    match backend {
        Backend::Mock => {
            warn!("mock backend selected; variables are registered but no profile data will arrive");
            Ok((
                Box::new(MockSubscriber::new()),
                Box::new(MockCommandChannel::default()),
            ))
        }
        Backend::Zmq => connect_zmq(cfg).await,
    }
}

#[cfg(feature = "zmq")]
async fn connect_zmq(
    cfg: &ServiceConfig,
) -> Result<(Box<dyn ProfileSubscriber>, Box<dyn CommandChannel>)> {
    use profile_transport::{ZmqCommandChannel, ZmqSubscriber};

    let data = cfg.profile_endpoint();
    let sub = ZmqSubscriber::connect(&data)
        .await
        .with_context(|| format!("connecting profile channel {data}"))?;
    let control = cfg.model_endpoint();
    let cmd = ZmqCommandChannel::connect(&control)
        .await
        .with_context(|| format!("connecting model channel {control}"))?;
    info!(data = %data, control = %control, "zmq channels connected");
    Ok((Box::new(sub), Box::new(cmd)))
}

#[cfg(not(feature = "zmq"))]
async fn connect_zmq(
    _cfg: &ServiceConfig,
) -> Result<(Box<dyn ProfileSubscriber>, Box<dyn CommandChannel>)> {
    Err(anyhow::anyhow!("zmq feature not enabled"))
}

fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
