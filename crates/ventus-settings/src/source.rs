//! Where the control loop reads the top speed from.

use async_trait::async_trait;

use crate::cell::TopSpeedCell;

/// Supplies the current top speed (mph) to the control loop.
///
/// Reads never fail: a source that cannot obtain a fresh value returns the
/// last good one.
#[async_trait]
pub trait TopSpeedSource: Send {
    /// Current top speed in mph.
    async fn top_speed(&mut self) -> f32;

    /// Short label for logs.
    fn describe(&self) -> String;
}

#[async_trait]
impl<T: TopSpeedSource + ?Sized> TopSpeedSource for Box<T> {
    async fn top_speed(&mut self) -> f32 {
        (**self).top_speed().await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Reads a [`TopSpeedCell`] owned by this process.
#[derive(Debug, Clone)]
pub struct SharedTopSpeed {
    cell: TopSpeedCell,
}

impl SharedTopSpeed {
    /// Wrap a cell; the caller keeps its own clone for writing.
    pub fn new(cell: TopSpeedCell) -> Self {
        Self { cell }
    }

    /// The underlying cell.
    pub fn cell(&self) -> &TopSpeedCell {
        &self.cell
    }
}

#[async_trait]
impl TopSpeedSource for SharedTopSpeed {
    async fn top_speed(&mut self) -> f32 {
        self.cell.get_mph()
    }

    fn describe(&self) -> String {
        "shared".to_string()
    }
}

/// A constant top speed.
#[derive(Debug, Clone, Copy)]
pub struct FixedTopSpeed(pub f32);

#[async_trait]
impl TopSpeedSource for FixedTopSpeed {
    async fn top_speed(&mut self) -> f32 {
        self.0
    }

    fn describe(&self) -> String {
        format!("fixed {} mph", self.0)
    }
}
