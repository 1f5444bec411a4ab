//! Loopback RPC service bring-up.
//!
//! One process-wide service is started the first time any filesystem is
//! mounted:
//!
//! 1. Bind a TCP socket to `127.0.0.1:0` and remember the OS-assigned port.
//! 2. Register `NFS_PROGRAM` at an unreal version number with the host port
//!    mapper. Some kernels' NFS clients hang when the port-map daemon is
//!    not running; any registration is enough to keep it alive, and the
//!    unreal version avoids colliding with a real NFS server on the
//!    machine. The mapping is unset before set, so re-registration is
//!    idempotent.
//! 3. Spawn the `kfs-nfs` service thread, which accepts connections and
//!    serves RPC records on a current-thread runtime. Requests are handled
//!    cooperatively on that one thread, so operations on a mount are
//!    totally ordered by arrival.
//!
//! Applications that need to attach runtime setup to server threads can
//! install begin/end hooks; they run immediately before the service loop
//! starts and after it exits.

use std::io::{self, Cursor};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::protocol::rpc;
use crate::protocol::xdr::{self, deserialize, portmap, Serialize};

/// The unreal NFS version registered with the port mapper.
const NFS_VUNREAL: u32 = 999;
/// Well-known port of the host port mapper.
const PMAP_PORT: u16 = 111;

#[derive(Default)]
struct ThreadHooks {
    begin: Option<fn()>,
    end: Option<fn()>,
}

static HOOKS: Mutex<ThreadHooks> = Mutex::new(ThreadHooks { begin: None, end: None });

/// Installs a hook invoked on the service thread before its loop starts.
/// Call before mounting anything.
pub fn set_thread_begin_callback(hook: fn()) {
    HOOKS.lock().expect("thread hooks lock").begin = Some(hook);
}

/// Installs a hook invoked on the service thread after its loop exits.
/// Call before mounting anything.
pub fn set_thread_end_callback(hook: fn()) {
    HOOKS.lock().expect("thread hooks lock").end = Some(hook);
}

static SERVICE_PORT: OnceLock<Result<u16, String>> = OnceLock::new();

/// Starts the service if it is not running yet and returns its port.
pub fn ensure_service() -> io::Result<u16> {
    match SERVICE_PORT.get_or_init(|| start_service().map_err(|e| e.to_string())) {
        Ok(port) => Ok(*port),
        Err(message) => Err(io::Error::other(message.clone())),
    }
}

fn start_service() -> io::Result<u16> {
    let listener = std::net::TcpListener::bind(("127.0.0.1", 0))?;
    let port = listener.local_addr()?.port();
    info!("kfs NFS service listening on 127.0.0.1:{}", port);

    // wake up the portmap daemon; failure is survivable on hosts whose
    // NFS client does not consult it
    pmap_unset(xdr::nfs3::PROGRAM, NFS_VUNREAL);
    if !pmap_set(xdr::nfs3::PROGRAM, NFS_VUNREAL, port) {
        warn!("could not register with the host port mapper");
    }

    std::thread::Builder::new()
        .name("kfs-nfs".to_string())
        .spawn(move || service_main(listener, port))?;
    Ok(port)
}

fn service_main(listener: std::net::TcpListener, port: u16) {
    let begin = HOOKS.lock().expect("thread hooks lock").begin;
    if let Some(hook) = begin {
        hook();
    }

    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build();
    match runtime {
        Ok(runtime) => {
            if let Err(e) = runtime.block_on(serve(listener, port)) {
                error!("service loop returned unexpectedly: {:?}", e);
            }
        }
        Err(e) => error!("cannot build service runtime: {:?}", e),
    }

    let end = HOOKS.lock().expect("thread hooks lock").end;
    if let Some(hook) = end {
        hook();
    }
}

async fn serve(listener: std::net::TcpListener, port: u16) -> io::Result<()> {
    listener.set_nonblocking(true)?;
    let listener = TcpListener::from_std(listener)?;
    loop {
        let (socket, peer) = listener.accept().await?;
        let context = rpc::Context { local_port: port, client_addr: peer.to_string() };
        info!("accepting connection from {}", context.client_addr);
        tokio::spawn(async move {
            if let Err(e) = process_socket(socket, context).await {
                debug!("connection closed: {:?}", e);
            }
        });
    }
}

/// Serves one connection: read a record, dispatch it, write the reply.
/// All connections share the single service thread, and the engine is
/// synchronous, so one RPC is in flight at a time.
async fn process_socket(
    mut socket: tokio::net::TcpStream,
    context: rpc::Context,
) -> Result<(), anyhow::Error> {
    let _ = socket.set_nodelay(true);
    let mut record = Vec::new();
    let mut reply = Vec::new();
    loop {
        rpc::read_record(&mut socket, &mut record).await?;
        reply.clear();
        {
            let mut input = Cursor::new(&record[..]);
            let mut output = Cursor::new(&mut reply);
            rpc::handle_rpc(&mut input, &mut output, &context)?;
        }
        if !reply.is_empty() {
            rpc::write_record(&mut socket, &reply).await?;
        }
    }
}

static PMAP_XID: AtomicU32 = AtomicU32::new(0x6b667300); // "kfs\0"

/// One blocking portmap transaction against the local daemon. Returns the
/// daemon's boolean answer, or false when it cannot be reached.
fn pmap_call(proc: u32, map: portmap::mapping) -> bool {
    let address = SocketAddr::from(([127, 0, 0, 1], PMAP_PORT));
    let timeout = Duration::from_secs(1);
    let mut stream = match std::net::TcpStream::connect_timeout(&address, timeout) {
        Ok(stream) => stream,
        Err(e) => {
            debug!("portmap unreachable: {:?}", e);
            return false;
        }
    };
    let _ = stream.set_read_timeout(Some(timeout));
    let _ = stream.set_write_timeout(Some(timeout));

    let xid = PMAP_XID.fetch_add(1, Ordering::Relaxed);
    let call = xdr::rpc::rpc_msg {
        xid,
        body: xdr::rpc::rpc_body::CALL(xdr::rpc::call_body {
            rpcvers: 2,
            prog: portmap::PROGRAM,
            vers: portmap::VERSION,
            proc,
            cred: xdr::rpc::opaque_auth::default(),
            verf: xdr::rpc::opaque_auth::default(),
        }),
    };

    let mut exchange = || -> Result<bool, anyhow::Error> {
        use std::io::{Read, Write};

        let mut body = Vec::new();
        call.serialize(&mut body)?;
        map.serialize(&mut body)?;
        let header = (body.len() as u32) | (1 << 31);
        stream.write_all(&header.to_be_bytes())?;
        stream.write_all(&body)?;

        let mut header_buf = [0_u8; 4];
        stream.read_exact(&mut header_buf)?;
        let length = (u32::from_be_bytes(header_buf) & ((1 << 31) - 1)) as usize;
        let mut reply = vec![0_u8; length];
        stream.read_exact(&mut reply)?;

        let mut cursor = Cursor::new(&reply[..]);
        let msg = deserialize::<xdr::rpc::rpc_msg>(&mut cursor)?;
        if msg.xid != xid {
            return Ok(false);
        }
        Ok(deserialize::<bool>(&mut cursor)?)
    };
    match exchange() {
        Ok(answer) => answer,
        Err(e) => {
            debug!("portmap call failed: {:?}", e);
            false
        }
    }
}

/// Registers `prog`/`vers` at `port` with the host port mapper.
fn pmap_set(prog: u32, vers: u32, port: u16) -> bool {
    pmap_call(
        portmap::PMAPPROC_SET,
        portmap::mapping { prog, vers, prot: portmap::IPPROTO_TCP, port: u32::from(port) },
    )
}

/// Removes any existing registration of `prog`/`vers`.
fn pmap_unset(prog: u32, vers: u32) -> bool {
    pmap_call(
        portmap::PMAPPROC_UNSET,
        portmap::mapping { prog, vers, prot: portmap::IPPROTO_TCP, port: 0 },
    )
}
