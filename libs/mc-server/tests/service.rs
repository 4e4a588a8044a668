//! Full round trips over a real socket on an ephemeral port.

use config::constants::{ServiceConfig, MAX_MESSAGE_SIZE};
use glam::Vec3;
use mc_expr::{Environment, Expression, Function, InfixOp};
use mc_extract::{ComputeSession, CpuDevice, SurfaceExtractor};
use mc_grid::{build_grid, Grid, GridCorner, GridSpec};
use mc_server::{
    read_response, write_request, MeshService, RequestFrame, RequestKind, ResponseFrame, Server, Status,
};
use mc_wire::{decode_response, encode_request, triangle_count};
use serde_json::json;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

struct Running {
    address: std::net::SocketAddr,
    stop: oneshot::Sender<()>,
    task: JoinHandle<Result<(), mc_server::ServerError>>,
}

async fn start(lenient: bool) -> Running {
    let config = ServiceConfig::new("127.0.0.1", 0, 64, lenient).unwrap();
    let extractor = SurfaceExtractor::spawn(ComputeSession::new(CpuDevice::new())).unwrap();
    let server = Server::bind(&config, MeshService::new(extractor, &config)).await.unwrap();
    let address = server.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();
    let task = tokio::spawn(server.run_until(async {
        let _ = stopped.await;
    }));
    Running { address, stop, task }
}

async fn exchange(stream: &mut TcpStream, kind: RequestKind, payload: &[u8]) -> ResponseFrame {
    write_request(stream, kind, payload).await.unwrap();
    read_response(stream, MAX_MESSAGE_SIZE).await.unwrap().unwrap()
}

fn sphere_grid() -> Grid {
    let square = |name: &str| Expression::infix(InfixOp::Pow, Expression::variable(name), Expression::number(2.0));
    let expr = Expression::infix(
        InfixOp::Sub,
        Expression::call(
            Function::Sqrt,
            Expression::infix(
                InfixOp::Add,
                Expression::infix(InfixOp::Add, square("x"), square("y")),
                square("z"),
            ),
        ),
        Expression::number(1.0),
    );
    build_grid(&GridSpec::new(Vec3::splat(-1.5), 0.2, 16), &expr, &Environment::new()).unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn binary_grid_request_returns_triangles() {
    let server = start(false).await;
    let mut stream = TcpStream::connect(server.address).await.unwrap();

    let response = exchange(&mut stream, RequestKind::Grid, &encode_request(&sphere_grid())).await;
    assert_eq!(response.status, Status::Ok);
    assert!(triangle_count(&response.payload) > 0);
    assert_eq!(response.payload.len() % 36, 0);
    for vertex in decode_response(&response.payload).unwrap() {
        assert!((Vec3::from(vertex).length() - 1.0).abs() < 0.2);
    }

    // constant grid on the level: success with an empty mesh
    let flat = Grid::from_corners(4, vec![GridCorner::default(); 64]).unwrap();
    let response = exchange(&mut stream, RequestKind::Grid, &encode_request(&flat)).await;
    assert_eq!(response.status, Status::Ok);
    assert!(response.payload.is_empty());

    server.stop.send(()).unwrap();
    server.task.await.unwrap().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn field_request_is_sampled_on_the_server() {
    let server = start(false).await;
    let mut stream = TcpStream::connect(server.address).await.unwrap();

    // plane x = 0.3
    let request = json!({
        "origin": [-1.0, -1.0, -1.0],
        "spacing": 0.25,
        "dimension": 9,
        "iso_level": 0.3,
        "function": {"body": {"ctype": "variable", "name": "x"}}
    });
    let response = exchange(&mut stream, RequestKind::Field, request.to_string().as_bytes()).await;
    assert_eq!(response.status, Status::Ok);
    let vertices = decode_response(&response.payload).unwrap();
    assert!(!vertices.is_empty());
    for vertex in vertices {
        assert!((vertex[0] - 0.3).abs() < 1e-5);
    }

    server.stop.send(()).unwrap();
    server.task.await.unwrap().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn bad_requests_get_error_frames_and_keep_the_connection() {
    let server = start(false).await;
    let mut stream = TcpStream::connect(server.address).await.unwrap();

    // truncated grid
    let response = exchange(&mut stream, RequestKind::Grid, &[2, 0, 0, 0, 1, 2, 3]).await;
    assert_eq!(response.status, Status::Error);
    assert!(String::from_utf8(response.payload).unwrap().contains("truncated"));

    // above the configured limit of 64
    let response = exchange(&mut stream, RequestKind::Grid, &65u32.to_le_bytes()).await;
    assert_eq!(response.status, Status::Error);

    // unsupported function under the default policy
    let request = json!({
        "origin": [0.0, 0.0, 0.0], "spacing": 1.0, "dimension": 2,
        "function": {"body": {"ctype": "function", "oper": "tan$1", "args": [{"ctype": "void"}]}}
    });
    let response = exchange(&mut stream, RequestKind::Field, request.to_string().as_bytes()).await;
    assert_eq!(response.status, Status::Error);

    // unknown kind byte
    stream.write_all(&[7, 0, 0, 0, 0]).await.unwrap();
    let response = read_response(&mut stream, MAX_MESSAGE_SIZE).await.unwrap().unwrap();
    assert_eq!(response.status, Status::Error);

    // connection still serves valid requests
    let flat = Grid::from_corners(2, vec![GridCorner::new([0.0; 3], 1.0); 8]).unwrap();
    let response = exchange(&mut stream, RequestKind::Grid, &encode_request(&flat)).await;
    assert_eq!(response.status, Status::Ok);

    server.stop.send(()).unwrap();
    server.task.await.unwrap().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn lenient_server_samples_unsupported_nodes_as_zero() {
    let server = start(true).await;
    let mut stream = TcpStream::connect(server.address).await.unwrap();

    let request = json!({
        "origin": [0.0, 0.0, 0.0], "spacing": 1.0, "dimension": 3,
        "function": {"body": {"ctype": "function", "oper": "tan$1", "args": [{"ctype": "void"}]}}
    });
    let response = exchange(&mut stream, RequestKind::Field, request.to_string().as_bytes()).await;
    assert_eq!(response.status, Status::Ok);
    assert!(response.payload.is_empty());

    server.stop.send(()).unwrap();
    server.task.await.unwrap().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn oversized_frame_closes_the_connection() {
    let server = start(false).await;
    let mut stream = TcpStream::connect(server.address).await.unwrap();

    let length = (MAX_MESSAGE_SIZE as u32 + 1).to_le_bytes();
    stream.write_all(&[0, length[0], length[1], length[2], length[3]]).await.unwrap();
    let response = read_response(&mut stream, MAX_MESSAGE_SIZE).await.unwrap().unwrap();
    assert_eq!(response.status, Status::Error);
    assert!(read_response(&mut stream, MAX_MESSAGE_SIZE).await.unwrap().is_none());

    server.stop.send(()).unwrap();
    server.task.await.unwrap().unwrap();
}

#[tokio::test(flavor = "current_thread")]
async fn single_threaded_runtime_stays_responsive_while_requests_run() {
    let config = ServiceConfig::new("127.0.0.1", 0, 64, false).unwrap();
    let extractor = SurfaceExtractor::spawn(ComputeSession::new(CpuDevice::new())).unwrap();
    let service = MeshService::new(extractor, &config);

    let grid = RequestFrame {
        kind: RequestKind::Grid.to_byte(),
        payload: encode_request(&sphere_grid()),
    };
    let field = RequestFrame {
        kind: RequestKind::Field.to_byte(),
        payload: json!({
            "origin": [-1.0, -1.0, -1.0], "spacing": 0.05, "dimension": 41, "iso_level": 0.3,
            "function": {"body": {"ctype": "variable", "name": "x"}}
        })
        .to_string()
        .into_bytes(),
    };

    let ticks = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let ticker = tokio::spawn({
        let ticks = ticks.clone();
        async move {
            loop {
                ticks.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
                tokio::task::yield_now().await;
            }
        }
    });

    let (grid, field) = tokio::join!(service.handle(grid), service.handle(field));
    ticker.abort();

    assert_eq!(grid.status, Status::Ok);
    assert!(triangle_count(&grid.payload) > 0);
    assert_eq!(field.status, Status::Ok);
    for vertex in decode_response(&field.payload).unwrap() {
        assert!((vertex[0] - 0.3).abs() < 1e-5);
    }
    assert!(ticks.load(std::sync::atomic::Ordering::Relaxed) > 0);
}
