use std::path::{Path, PathBuf};

use jobsheet_core::JobRecord;

use crate::error::RenderError;
use crate::layout::{layout_receipt, ReceiptGeometry, ReceiptLayout};
use crate::output::{receipt_file_name, write_receipt};
use crate::pdf;
use crate::shop::ShopProfile;

/// A rendered receipt, not yet on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReceipt {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Renders two-copy receipts for one shop.
#[derive(Debug, Clone)]
pub struct ReceiptRenderer {
    shop: ShopProfile,
    geometry: ReceiptGeometry,
}

impl ReceiptRenderer {
    pub fn new(shop: ShopProfile) -> Self {
        Self::with_geometry(shop, ReceiptGeometry::a4())
    }

    pub fn with_geometry(shop: ShopProfile, geometry: ReceiptGeometry) -> Self {
        Self { shop, geometry }
    }

    pub fn shop(&self) -> &ShopProfile {
        &self.shop
    }

    pub fn layout(&self, record: &JobRecord) -> ReceiptLayout {
        layout_receipt(record, &self.shop, &self.geometry)
    }

    pub fn render(&self, record: &JobRecord) -> Result<RenderedReceipt, RenderError> {
        let layout = self.layout(record);
        let bytes = pdf::encode(&layout.page)?;
        Ok(RenderedReceipt {
            file_name: receipt_file_name(record),
            bytes,
        })
    }

    /// Render and write into `dir`; returns the written path.
    pub fn render_to_dir(&self, record: &JobRecord, dir: &Path) -> Result<(PathBuf, RenderedReceipt), RenderError> {
        let receipt = self.render(record)?;
        let path = write_receipt(dir, &receipt.file_name, &receipt.bytes)?;
        tracing::info!(code = %record.code, path = %path.display(), bytes = receipt.bytes.len(), "receipt written");
        Ok((path, receipt))
    }
}
