// KW Planner
// Copyright (C) 2025 KW Planner contributors

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! HTTP server implementation using Hyper

use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::router::{AppState, Router};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use kwplanner_core::EngineFactory;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tracing::{error, info};

/// API server using Hyper
pub struct ApiServer {
    bind_address: SocketAddr,
    listener: TcpListener,
    router: Arc<Router>,
}

impl ApiServer {
    /// Create a new API server, binding the listener immediately so the
    /// effective address (including an OS-assigned port) is known.
    pub async fn new(config: Config, factory: Arc<dyn EngineFactory>) -> ApiResult<Self> {
        // Parse bind address
        let requested: SocketAddr = config.bind_address.parse().map_err(|e| ApiError::BadRequest {
            message: format!("Invalid bind address: {}", e),
        })?;

        // The engine expects its supporting files to live here.
        std::fs::create_dir_all(&config.data_dir)?;

        let listener = TcpListener::bind(requested).await?;
        let bind_address = listener.local_addr()?;

        let state = AppState {
            config: Arc::new(config),
            factory,
        };
        let router = Arc::new(Router::new(state));

        info!("API server created successfully");

        Ok(Self {
            bind_address,
            listener,
            router,
        })
    }

    /// Get the bind address
    pub fn bind_address(&self) -> SocketAddr {
        self.bind_address
    }

    /// Start the server
    pub async fn run(self) -> ApiResult<()> {
        info!("KW Planner API listening on http://{}", self.bind_address);

        // Accept connections
        loop {
            let (stream, remote_addr) = match self.listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                    continue;
                }
            };

            let io = TokioIo::new(stream);
            let router = self.router.clone();

            // Spawn a task to handle the connection
            tokio::task::spawn(async move {
                let service = ServiceBuilder::new().service(service_fn(move |req: Request<Incoming>| {
                    let router = router.clone();
                    async move {
                        let request_origin = req
                            .headers()
                            .get(hyper::header::ORIGIN)
                            .and_then(|v| v.to_str().ok())
                            .map(String::from);
                        let response = match router.route(req).await {
                            Ok(response) => response,
                            Err(e) => {
                                error!("Request failed: {}", e);
                                Response::from(e)
                            }
                        };
                        Ok::<_, Infallible>(router.apply_cors(response, request_origin.as_deref()))
                    }
                }));

                // Serve the connection
                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    error!("Error serving connection from {}: {}", remote_addr, err);
                }
            });
        }
    }
}
