use profile_transport::{Command, CommandChannel, Result};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Ask the upstream model to start producing profiles. The reply content is
/// not interpreted; its length is returned.
pub async fn request_profiles<C: CommandChannel + ?Sized>(channel: &mut C) -> Result<usize> {
    let cmd = Command::send_profiles_twiss();
    let reply = channel.request(&cmd).await?;
    info!(cmd = %cmd.cmd, reply_bytes = reply.len(), "profile request acknowledged");
    Ok(reply.len())
}

/// Fire the profile request on its own task so the ingestion loop never waits
/// on it. Failures are logged and not retried.
pub fn spawn_profile_request(mut channel: Box<dyn CommandChannel>) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = request_profiles(channel.as_mut()).await {
            warn!(error = %e, "profile request failed");
        }
    })
}
