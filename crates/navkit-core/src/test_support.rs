#![forbid(unsafe_code)]

//! Recording surface for unit tests.

use crate::surface::{DomOp, NavLayout, NavSurface};

#[derive(Debug, Clone)]
pub(crate) struct RecordingSurface {
    pub layout: NavLayout,
    pub width: u32,
    pub scroll: i32,
    pub ops: Vec<DomOp>,
}

impl RecordingSurface {
    pub fn new(layout: NavLayout, width: u32) -> Self {
        Self {
            layout,
            width,
            scroll: 0,
            ops: Vec::new(),
        }
    }
}

impl NavSurface for RecordingSurface {
    fn layout(&self) -> NavLayout {
        self.layout.clone()
    }

    fn viewport_width(&self) -> u32 {
        self.width
    }

    fn scroll_offset(&self) -> i32 {
        self.scroll
    }

    fn apply(&mut self, op: DomOp) {
        self.ops.push(op);
    }
}
