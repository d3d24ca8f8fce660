//! 批量規則實現

use mrp_core::{MrpError, MrpParameters, Result, Supplier};
use rust_decimal::Decimal;

/// 批量（必為正數）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LotSize(Decimal);

impl LotSize {
    /// 建立批量；零或負數拒絕
    pub fn new(size: Decimal) -> Result<Self> {
        if size <= Decimal::ZERO {
            return Err(MrpError::InvalidParameter {
                name: "lot_size".to_string(),
                value: size.to_string(),
            });
        }
        Ok(Self(size))
    }

    /// 自製件：最小生產批量
    pub fn for_make(params: &MrpParameters) -> Result<Self> {
        Self::new(params.min_batch_size)
    }

    /// 採購件：最小訂購量 × 訂單倍數
    pub fn for_buy(supplier: &Supplier, params: &MrpParameters) -> Result<Self> {
        Self::new(supplier.min_order_qty * params.order_multiple)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// 將淨需求調整為批量的整數倍
    ///
    /// `ceil(max(淨需求, 批量) / 批量) × 批量`；淨需求不為正時回傳 0。
    pub fn quantize(&self, net_demand: Decimal) -> Decimal {
        if net_demand <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        (net_demand.max(self.0) / self.0).ceil() * self.0
    }
}
