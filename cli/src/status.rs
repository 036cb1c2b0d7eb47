// Status HTTP endpoint — liveness, identity, and advertised address
//
// Render-style platforms health-check GET / on $PORT; /peerid and
// /multiaddr let clients bootstrap without hardcoding the relay identity.
// Every response is rendered from an immutable snapshot, so no query
// mutates state and repeated queries are byte-identical.

use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, Server, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;
use waypoint_core::StatusSnapshot;

async fn handle_request(
    req: Request<Body>,
    snapshot: StatusSnapshot,
) -> Result<Response<Body>, Infallible> {
    let response = match (req.method(), req.uri().path()) {
        (&Method::GET, "/") => text_response(StatusCode::OK, "ok".to_string()),
        (&Method::GET, "/peerid") => text_response(StatusCode::OK, snapshot.peer_id()),
        (&Method::GET, "/multiaddr") => text_response(StatusCode::OK, snapshot.dial_address()),
        _ => text_response(StatusCode::NOT_FOUND, "Not found".to_string()),
    };

    Ok(response)
}

fn text_response(status: StatusCode, body: String) -> Response<Body> {
    Response::builder()
        .status(status)
        .header("content-type", "text/plain; charset=utf-8")
        .body(Body::from(body))
        .unwrap_or_else(|_| Response::new(Body::empty()))
}

/// Serve the status endpoint until the process exits.
///
/// The relay runs fine without its status surface, so bind or serve
/// failures are logged and swallowed instead of taking the node down.
pub async fn serve(port: u16, snapshot: StatusSnapshot) {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let make_svc = make_service_fn(move |_conn| {
        let snapshot = snapshot.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |req| {
                handle_request(req, snapshot.clone())
            }))
        }
    });

    let server = match Server::try_bind(&addr) {
        Ok(builder) => builder.serve(make_svc),
        Err(e) => {
            tracing::error!("Status server failed to bind {}: {}", addr, e);
            return;
        }
    };

    tracing::info!("Status server listening on {}", addr);

    if let Err(e) = server.await {
        tracing::error!("Status server failed: {}", e);
    }
}
