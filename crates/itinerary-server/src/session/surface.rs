//! Rendering surface seam.
//!
//! The session pushes marker and path changes through [`RenderSurface`]; it
//! never reads drawing state back.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

use itinerary_core::{GeoPoint, Marker, MarkerHandle, Notice, RenderOp};

pub trait RenderSurface: Send {
    fn add_marker(&mut self, marker: &Marker);
    fn remove_marker(&mut self, handle: MarkerHandle);
    fn describe_marker(&mut self, handle: MarkerHandle, description: &str);
    fn set_route_path(&mut self, path: Option<&[GeoPoint]>);
    fn request_redraw(&mut self);
    fn notify(&mut self, notice: Notice);
}

/// Forward one synchronizer op to a surface.
pub fn apply_op(surface: &mut dyn RenderSurface, op: &RenderOp) {
    match op {
        RenderOp::AddMarker { marker } => surface.add_marker(marker),
        RenderOp::RemoveMarker { handle } => surface.remove_marker(*handle),
        RenderOp::DescribeMarker {
            handle,
            description,
        } => surface.describe_marker(*handle, description),
        RenderOp::SetRoutePath { path } => surface.set_route_path(path.as_deref()),
        RenderOp::Redraw => surface.request_redraw(),
    }
}

/// What viewers receive on the stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SurfaceFrame {
    Render {
        op: RenderOp,
    },
    Notice {
        notice: Notice,
        message: String,
        issued_at: DateTime<Utc>,
    },
}

/// Surface that fans frames out to every connected viewer.
///
/// Frames sent while nobody listens are dropped.
pub struct BroadcastSurface {
    tx: broadcast::Sender<SurfaceFrame>,
}

impl BroadcastSurface {
    pub fn new(tx: broadcast::Sender<SurfaceFrame>) -> Self {
        Self { tx }
    }

    fn send(&self, frame: SurfaceFrame) {
        let _ = self.tx.send(frame);
    }

    fn render(&self, op: RenderOp) {
        self.send(SurfaceFrame::Render { op });
    }
}

impl RenderSurface for BroadcastSurface {
    fn add_marker(&mut self, marker: &Marker) {
        tracing::debug!("Marker {} added: {} at {}", marker.handle, marker.title, marker.position);
        self.render(RenderOp::AddMarker {
            marker: marker.clone(),
        });
    }

    fn remove_marker(&mut self, handle: MarkerHandle) {
        tracing::debug!("Marker {} removed", handle);
        self.render(RenderOp::RemoveMarker { handle });
    }

    fn describe_marker(&mut self, handle: MarkerHandle, description: &str) {
        self.render(RenderOp::DescribeMarker {
            handle,
            description: description.to_string(),
        });
    }

    fn set_route_path(&mut self, path: Option<&[GeoPoint]>) {
        self.render(RenderOp::SetRoutePath {
            path: path.map(|points| points.to_vec()),
        });
    }

    fn request_redraw(&mut self) {
        self.render(RenderOp::Redraw);
    }

    fn notify(&mut self, notice: Notice) {
        tracing::info!("Notice: {}", notice.message());
        self.send(SurfaceFrame::Notice {
            notice,
            message: notice.message().to_string(),
            issued_at: Utc::now(),
        });
    }
}
