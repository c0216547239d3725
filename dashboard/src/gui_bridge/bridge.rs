use crate::gui_bridge::model::{DashboardModel, SessionState};
use crate::gui_bridge::session;
use crate::workflow::runner::Runner;
use crate::workflow::uploads::UploadStore;
use anyhow::{Context, Result};
use mapvalcore::render::{Figure, FigureStyle};
use mapvalcore::telemetry::{MetricsRecorder, MetricsSnapshot};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{
    net::SocketAddr,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
    thread,
};
use tokio::runtime::Builder;
use warp::http::StatusCode;
use warp::hyper::body::Bytes;
use warp::reply::{Reply, Response};
use warp::{Filter, Rejection};

/// Largest map accepted by `POST /upload`.
const MAX_UPLOAD_BYTES: u64 = 256 * 1024 * 1024;

#[derive(Debug, Deserialize)]
struct UploadQuery {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct SelectRequest {
    row: Option<usize>,
}

#[derive(Debug, Serialize)]
struct StatusReply {
    status: String,
    revision: u64,
    metrics: MetricsSnapshot,
}

struct BridgeState {
    session: RwLock<SessionState>,
    runner: Runner,
    uploads: UploadStore,
    metrics: MetricsRecorder,
    style: FigureStyle,
}

impl BridgeState {
    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.session.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.session.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Bridge that owns the session and serves it over HTTP.
#[derive(Clone)]
pub struct GuiBridge {
    inner: Arc<BridgeState>,
}

impl GuiBridge {
    pub fn new(runner: Runner) -> Self {
        let config = runner.config();
        let uploads = UploadStore::new(config.upload_dir.clone());
        let style = config.figure_style();
        Self {
            inner: Arc::new(BridgeState {
                session: RwLock::new(SessionState::new()),
                runner,
                uploads,
                metrics: MetricsRecorder::new(),
                style,
            }),
        }
    }

    pub fn upload(&self, file_name: &str, bytes: &[u8]) -> Result<DashboardModel> {
        let inner = &self.inner;
        let mut state = inner.write();
        session::upload(
            &mut state,
            &inner.runner,
            &inner.uploads,
            &inner.metrics,
            file_name,
            bytes,
        )?;
        Ok(state.snapshot())
    }

    pub fn rerun(&self) -> DashboardModel {
        let mut state = self.inner.write();
        session::rerun(&mut state, &self.inner.runner, &self.inner.metrics);
        state.snapshot()
    }

    pub fn select(&self, row: Option<usize>) -> Result<DashboardModel> {
        let mut state = self.inner.write();
        session::select(&mut state, &self.inner.metrics, row)?;
        Ok(state.snapshot())
    }

    pub fn delete(&self) -> Result<DashboardModel> {
        let mut state = self.inner.write();
        session::delete(&mut state, &self.inner.uploads)?;
        Ok(state.snapshot())
    }

    pub fn figure(&self) -> Figure {
        session::figure(&self.inner.read(), &self.inner.style)
    }

    pub fn snapshot(&self) -> DashboardModel {
        self.inner.read().snapshot()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.inner.metrics.snapshot()
    }

    pub fn publish_status(&self, message: &str) {
        log::info!("[GUI] {message}");
        let mut state = self.inner.write();
        state.status = message.to_string();
        state.touch();
    }

    pub fn routes(&self) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
        let bridge = self.clone();
        let bridge_filter = warp::any().map(move || bridge.clone());

        let session_route = warp::path("session")
            .and(warp::path::end())
            .and(warp::get())
            .and(bridge_filter.clone())
            .map(|bridge: GuiBridge| warp::reply::json(&bridge.snapshot()).into_response());

        let figure_route = warp::path("figure")
            .and(warp::path::end())
            .and(warp::get())
            .and(bridge_filter.clone())
            .map(|bridge: GuiBridge| warp::reply::json(&bridge.figure()).into_response());

        let svg_route = warp::path("figure.svg")
            .and(warp::path::end())
            .and(warp::get())
            .and(bridge_filter.clone())
            .map(|bridge: GuiBridge| match bridge.figure().to_svg() {
                Ok(svg) => warp::reply::with_header(svg, "content-type", "image/svg+xml")
                    .into_response(),
                Err(err) => {
                    error_reply(&anyhow::Error::new(err), StatusCode::INTERNAL_SERVER_ERROR)
                }
            });

        let status_route = warp::path("status")
            .and(warp::path::end())
            .and(warp::get())
            .and(bridge_filter.clone())
            .map(|bridge: GuiBridge| {
                let state = bridge.snapshot();
                warp::reply::json(&StatusReply {
                    status: state.status,
                    revision: state.revision,
                    metrics: bridge.metrics(),
                })
                .into_response()
            });

        let upload_route = warp::path("upload")
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::query::<UploadQuery>())
            .and(warp::body::content_length_limit(MAX_UPLOAD_BYTES))
            .and(warp::body::bytes())
            .and(bridge_filter.clone())
            .map(|query: UploadQuery, body: Bytes, bridge: GuiBridge| {
                model_reply(bridge.upload(&query.name, &body), StatusCode::BAD_REQUEST)
            });

        let rerun_route = warp::path("rerun")
            .and(warp::path::end())
            .and(warp::post())
            .and(bridge_filter.clone())
            .map(|bridge: GuiBridge| warp::reply::json(&bridge.rerun()).into_response());

        let select_route = warp::path("select")
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::json())
            .and(bridge_filter.clone())
            .map(|request: SelectRequest, bridge: GuiBridge| {
                model_reply(bridge.select(request.row), StatusCode::BAD_REQUEST)
            });

        let delete_route = warp::path("delete")
            .and(warp::path::end())
            .and(warp::post())
            .and(bridge_filter)
            .map(|bridge: GuiBridge| {
                model_reply(bridge.delete(), StatusCode::INTERNAL_SERVER_ERROR)
            });

        session_route
            .or(figure_route)
            .unify()
            .or(svg_route)
            .unify()
            .or(status_route)
            .unify()
            .or(upload_route)
            .unify()
            .or(rerun_route)
            .unify()
            .or(select_route)
            .unify()
            .or(delete_route)
            .unify()
    }

    /// Binds `addr` and serves `routes()` on a background thread with its own
    /// runtime. Returns the bound address; a bind failure is returned, not logged.
    pub fn serve(&self, addr: SocketAddr) -> Result<SocketAddr> {
        let routes = self.routes();
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .context("building bridge runtime")?;
        let (bound, server) = {
            let _guard = runtime.enter();
            warp::serve(routes)
                .try_bind_ephemeral(addr)
                .with_context(|| format!("binding HTTP bridge to {addr}"))?
        };
        log::info!("[GUI] serving on http://{bound}");
        thread::spawn(move || runtime.block_on(server));
        Ok(bound)
    }
}

fn model_reply(result: Result<DashboardModel>, failure: StatusCode) -> Response {
    match result {
        Ok(model) => warp::reply::json(&model).into_response(),
        Err(err) => error_reply(&err, failure),
    }
}

fn error_reply(err: &anyhow::Error, status: StatusCode) -> Response {
    log::warn!("request failed: {err:#}");
    warp::reply::with_status(
        warp::reply::json(&json!({"status": "error", "message": format!("{err:#}")})),
        status,
    )
    .into_response()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::testing::{config_in, fake_validator, TWO_LANE_MAP, TWO_LANE_REPORT};
    use tempfile::tempdir;

    fn bridge_in(dir: &std::path::Path) -> GuiBridge {
        let config = config_in(dir, fake_validator(dir, TWO_LANE_REPORT));
        GuiBridge::new(Runner::new(config))
    }

    #[tokio::test]
    async fn upload_then_select_over_http() {
        let dir = tempdir().unwrap();
        let bridge = bridge_in(dir.path());
        let routes = bridge.routes();

        let res = warp::test::request()
            .method("POST")
            .path("/upload?name=map.osm")
            .body(TWO_LANE_MAP)
            .reply(&routes)
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        let model: DashboardModel = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(model.rows.len(), 2);
        assert_eq!(model.shape_count, 7);

        let res = warp::test::request()
            .method("POST")
            .path("/select")
            .json(&json!({"row": 0}))
            .reply(&routes)
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        let model: DashboardModel = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(model.selected_id.as_deref(), Some("2"));

        let res = warp::test::request().path("/figure").reply(&routes).await;
        let figure: Figure = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(figure.highlighted_ids(), vec![2]);

        let res = warp::test::request().path("/figure.svg").reply(&routes).await;
        assert_eq!(res.headers()["content-type"], "image/svg+xml");
        assert!(String::from_utf8_lossy(res.body()).contains("<svg"));
    }

    #[tokio::test]
    async fn rejects_non_map_upload() {
        let dir = tempdir().unwrap();
        let routes = bridge_in(dir.path()).routes();
        let res = warp::test::request()
            .method("POST")
            .path("/upload?name=notes.txt")
            .body("hello")
            .reply(&routes)
            .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn select_out_of_range_is_a_bad_request() {
        let dir = tempdir().unwrap();
        let routes = bridge_in(dir.path()).routes();
        let res = warp::test::request()
            .method("POST")
            .path("/select")
            .json(&json!({"row": 3}))
            .reply(&routes)
            .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn serve_reports_an_address_in_use() {
        let dir = tempdir().unwrap();
        let bridge = bridge_in(dir.path());
        let held = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = held.local_addr().unwrap();

        let err = bridge.serve(addr).unwrap_err();
        assert!(format!("{err:#}").contains(&addr.to_string()));
    }

    #[test]
    fn serve_binds_an_ephemeral_port() {
        let dir = tempdir().unwrap();
        let bridge = bridge_in(dir.path());
        let bound = bridge.serve(SocketAddr::from(([127, 0, 0, 1], 0))).unwrap();
        assert_ne!(bound.port(), 0);
        assert!(std::net::TcpStream::connect(bound).is_ok());
    }

    #[test]
    fn publish_status_bumps_revision() {
        let dir = tempdir().unwrap();
        let bridge = bridge_in(dir.path());
        bridge.publish_status("ready");
        let model = bridge.snapshot();
        assert_eq!(model.status, "ready");
        assert_eq!(model.revision, 1);
        assert_eq!(bridge.metrics().runs, 0);
    }
}
