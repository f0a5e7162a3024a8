use std::cell::RefCell;
use std::rc::Rc;

use crate::error::NovaError;

use super::{CameraHandle, Renderer};

/// Camera projection parameters.
///
/// Only perspective and orthographic projections can be re-fitted to a new
/// viewport; anything else is carried through untouched and reported on resize.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    Perspective {
        /// Vertical field of view in degrees.
        fov: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },
    Orthographic {
        left: f32,
        right: f32,
        top: f32,
        bottom: f32,
        near: f32,
        far: f32,
    },
    Other {
        kind: String,
    },
}

impl Projection {
    pub fn perspective(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        Projection::Perspective { fov, aspect, near, far }
    }

    pub fn orthographic(left: f32, right: f32, top: f32, bottom: f32, near: f32, far: f32) -> Self {
        Projection::Orthographic { left, right, top, bottom, near, far }
    }

    /// Orthographic projection centered on the origin covering `width × height`.
    pub fn centered_orthographic(width: f32, height: f32, near: f32, far: f32) -> Self {
        let (hw, hh) = (width / 2.0, height / 2.0);
        Projection::orthographic(-hw, hw, hh, -hh, near, far)
    }

    pub fn kind(&self) -> &str {
        match self {
            Projection::Perspective { .. } => "perspective",
            Projection::Orthographic { .. } => "orthographic",
            Projection::Other { kind } => kind,
        }
    }

    /// Re-fits the projection to a `width × height` viewport.
    ///
    /// Perspective: `aspect = width / height`. Orthographic: symmetric extents
    /// `±width/2`, `±height/2`. A zero height leaves the perspective aspect
    /// unchanged.
    pub fn fit(&mut self, width: f32, height: f32) -> Result<(), NovaError> {
        match self {
            Projection::Perspective { aspect, .. } => {
                if height > 0.0 {
                    *aspect = width / height;
                }
                Ok(())
            }
            Projection::Orthographic { left, right, top, bottom, .. } => {
                *left = -width / 2.0;
                *right = width / 2.0;
                *top = height / 2.0;
                *bottom = -height / 2.0;
                Ok(())
            }
            Projection::Other { kind } => Err(NovaError::UnsupportedCameraKind { kind: kind.clone() }),
        }
    }
}

/// A collaborator camera together with the projection the engine manages.
#[derive(Debug, Clone)]
pub struct Camera {
    handle: CameraHandle,
    projection: Projection,
}

pub type SharedCamera = Rc<RefCell<Camera>>;

impl Camera {
    pub fn new(renderer: &mut dyn Renderer, projection: Projection) -> Self {
        let handle = renderer.create_camera(&projection);
        Self { handle, projection }
    }

    #[inline]
    pub fn handle(&self) -> CameraHandle {
        self.handle
    }

    #[inline]
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Replaces the projection and pushes it to the collaborator.
    pub fn set_projection(&mut self, renderer: &mut dyn Renderer, projection: Projection) {
        self.projection = projection;
        renderer.update_projection(self.handle, &self.projection);
    }

    /// Re-fits the projection to the new viewport size and pushes it to the
    /// collaborator. Unsupported projections are left unchanged.
    pub fn resize(&mut self, renderer: &mut dyn Renderer, width: f32, height: f32) -> Result<(), NovaError> {
        self.projection.fit(width, height)?;
        renderer.update_projection(self.handle, &self.projection);
        Ok(())
    }
}
