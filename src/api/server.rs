use crate::api::routes;
use crate::config::SharedConfig;
use crate::redirect::SharedRedirects;
use crate::resolver::SharedResolver;
use std::future::Future;
use std::net::SocketAddr;

#[derive(Clone)]
pub(super) struct AppState {
    pub config: SharedConfig,
    pub resolver: SharedResolver,
    pub redirects: SharedRedirects,
}

pub fn new(
    config: SharedConfig,
    resolver: SharedResolver,
    redirects: SharedRedirects,
) -> impl Future<Output = hyper::Result<()>> {
    axum::Server::bind(&config.http_bind_addr).serve(
        routes::new(AppState {
            config,
            resolver,
            redirects,
        })
        .into_make_service_with_connect_info::<SocketAddr>(),
    )
}
