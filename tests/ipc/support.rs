use anyhow::Result;
use async_trait::async_trait;
use futures_util::SinkExt;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use szcontext::capabilities::{ApplicationCapability, CapabilityRegistry};
use szcontext::config::CapabilitiesConfig;
use szcontext::ipc::{
    Endpoint, HelperCodec, HelperFrame, HelperServer, Launcher, RequestHandler,
};
use szcontext::paths::AuthorizedRoots;
use szcontext::requester::Requester;
use szcontext::version::{PROTOCOL_VERSION, Version};
use tempfile::TempDir;
use tokio::net::{UnixListener, UnixStream};
use tokio::task::JoinHandle;
use tokio_util::codec::Framed;
use tokio_util::sync::CancellationToken;

pub const SERVICE: &str = "test.szcontext.helper";

/// Records every launch instead of spawning anything.
#[derive(Clone, Default)]
pub struct CountingLauncher {
    pub launches: Arc<AtomicUsize>,
    pub fail_with: Option<String>,
}

#[async_trait]
impl Launcher for CountingLauncher {
    async fn launch(&self, _: &ApplicationCapability, _: &Path) -> Result<()> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        match &self.fail_with {
            Some(cause) => anyhow::bail!("{cause}"),
            None => Ok(()),
        }
    }
}

/// A real helper server on a temporary socket.
pub struct TestHelper {
    pub endpoint: Endpoint,
    launches: Arc<AtomicUsize>,
    shutdown: CancellationToken,
    task: JoinHandle<Result<()>>,
    _dir: TempDir,
}

impl TestHelper {
    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub async fn stop(self) {
        self.shutdown.cancel();
        self.task.await.unwrap().unwrap();
    }
}

pub struct HelperOptions {
    pub version: Version,
    pub fail_with: Option<String>,
    pub allowed_uid: Option<u32>,
}

impl Default for HelperOptions {
    fn default() -> Self {
        Self {
            version: PROTOCOL_VERSION,
            fail_with: None,
            allowed_uid: None,
        }
    }
}

pub fn spawn_helper(options: HelperOptions) -> TestHelper {
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("helper.sock");
    let launcher = CountingLauncher {
        fail_with: options.fail_with,
        ..CountingLauncher::default()
    };
    let launches = Arc::clone(&launcher.launches);
    let handler = RequestHandler::new(CapabilityRegistry::builtin().unwrap(), launcher)
        .with_version(options.version);

    let mut server = HelperServer::bind(&socket, SERVICE, handler).unwrap();
    if let Some(uid) = options.allowed_uid {
        server = server.with_allowed_uid(uid);
    }
    let shutdown = CancellationToken::new();
    let task = tokio::spawn(server.serve(shutdown.clone()));

    TestHelper {
        endpoint: Endpoint::new(socket, SERVICE).with_request_timeout(Duration::from_secs(2)),
        launches,
        shutdown,
        task,
        _dir: dir,
    }
}

pub fn requester(endpoint: &Endpoint, roots: &[&str]) -> Requester {
    Requester::new(
        CapabilityRegistry::builtin().unwrap(),
        AuthorizedRoots::from_paths(roots.iter().copied()),
        CapabilitiesConfig::default(),
        endpoint.clone(),
    )
}

/// A scripted helper: greets once, then hands the channel to `script`.
pub fn fake_helper<F, Fut>(request_timeout: Duration, script: F) -> (TempDir, Endpoint, JoinHandle<()>)
where
    F: FnOnce(Framed<UnixStream, HelperCodec>) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("helper.sock");
    let listener = UnixListener::bind(&socket).unwrap();

    let task = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut framed = Framed::new(stream, HelperCodec::new());
        framed
            .send(HelperFrame::Welcome {
                service: SERVICE.into(),
                version: PROTOCOL_VERSION,
            })
            .await
            .unwrap();
        script(framed).await;
    });

    let endpoint = Endpoint::new(socket, SERVICE).with_request_timeout(request_timeout);
    (dir, endpoint, task)
}
