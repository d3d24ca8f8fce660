//! # 腳踏車 MRP 計算完整範例
//!
//! 這個範例展示完整的 MRP 計算流程：
//! - 產品：腳踏車、滑板車
//! - 半成品：車架、輪組
//! - 需求：月度銷售預測
//! - 手動調整採購量後的庫存傳播

use anyhow::Context;
use mrp_core::{
    BomRow, HierarchyPolicy, InventoryBook, InventoryPool, InventoryRow, PlanRow, RawTable,
    SupplierRow,
};
use mrp_planner::{
    logging, DirtyTracker, ExplodeOptions, MrpCalculator, MrpParameters,
    PropagationEngine, PurchasePlanExt,
};
use rust_decimal::Decimal;

fn main() -> anyhow::Result<()> {
    logging::init();

    println!("🚲 ===== 腳踏車 MRP 計算範例 =====");
    println!();

    // ========== 1. 載入 BOM 結構 ==========
    println!("🔧 步驟 1: 載入 BOM 結構");
    let params = MrpParameters::default()
        .with_safety_stock_days(Decimal::from(10))
        .with_min_batch_size(Decimal::from(50))
        .with_planning_horizon(3)
        .with_hierarchy_policy(HierarchyPolicy::Reject);
    let calculator = MrpCalculator::new(params)?;

    let bom_rows = BomRow::from_table(&bom_table()).context("BOM 資料格式錯誤")?;
    let bom = calculator.load_bom(&bom_rows).context("BOM 載入失敗")?;
    println!("   ✓ BOM 節點數: {}", bom.graph().node_count());
    println!("   ✓ BOM 邊數: {}", bom.graph().edge_count());
    for material in bom.materials() {
        println!("   - {:<8} {:?}", material.id, material.material_type);
    }
    println!();

    // ========== 2. 單品展開 ==========
    println!("🌳 步驟 2: 展開 10 台腳踏車");
    let components = bom.explode_for_quantity("BIKE", Decimal::from(10), &ExplodeOptions::new())?;
    for component in &components {
        println!(
            "   {:<8} 層級 {} 數量 {}",
            component.component_id, component.min_level, component.total_qty
        );
    }
    println!();

    // ========== 3. 生產計劃 ==========
    println!("🏭 步驟 3: 成品生產計劃");
    let forecast: Vec<_> = PlanRow::from_table(&forecast_table())?
        .into_iter()
        .map(PlanRow::into_forecast)
        .collect();
    let inventory = inventory()?;
    let production = calculator.plan_production(&forecast, &inventory)?;
    for entry in production.plan.entries() {
        println!(
            "   {} {} 需求 {} 生產 {} 期末 {}",
            entry.material_id, entry.period, entry.demand, entry.produced, entry.ending_inventory
        );
    }
    println!();

    // ========== 4. 物料需求與採購 ==========
    println!("📦 步驟 4: 物料需求與採購計劃");
    let suppliers = SupplierRow::from_table(&supplier_table())?;
    let mut report = calculator.plan_materials(&bom, &production.plan, &inventory, &suppliers)?;

    println!("   原料需求:");
    for requirement in &report.raw_requirements {
        println!("     {:<8} {}", requirement.material_id, requirement.total_qty);
    }
    println!("   半成品需求:");
    for requirement in &report.semifinished_requirements {
        println!("     {:<8} {}", requirement.material_id, requirement.total_qty);
    }
    println!("   採購單:");
    for line in report.purchase_plan.orders() {
        println!(
            "     {:<8} {} 下單 {} 到貨 {} 數量 {} 金額 {}",
            line.entry.material_id,
            line.supplier_id,
            line.order_date,
            line.delivery_date,
            line.quantity(),
            line.cost
        );
    }
    println!();

    // ========== 5. 手動調整 ==========
    println!("✏️  步驟 5: 調整 SPOKE 第一期採購量");
    let mut tracker = DirtyTracker::for_run(report.run_id);
    let first_period = report
        .purchase_plan
        .for_material("SPOKE")
        .next()
        .map(|line| line.entry.period)
        .context("SPOKE 沒有採購計劃")?;
    let touched = PropagationEngine::adjust_tracked(
        &mut report.purchase_plan,
        &mut tracker,
        "SPOKE",
        first_period,
        Decimal::from(5000),
    )?;
    println!("   ✓ 更新 {} 期", touched);
    println!("   ✓ 需要重新計算: {}", tracker.is_stale(report.run_id));
    println!();

    // ========== 6. 摘要 ==========
    println!("📊 摘要");
    println!("   原料種類: {}", report.summary.total_raw_materials);
    println!("   半成品種類: {}", report.summary.total_semifinished);
    println!("   計劃期數: {}", report.summary.planning_horizon);
    println!("   採購總金額: {}", report.purchase_plan.total_cost());
    if let Some(elapsed) = report.calculation_time_ms {
        println!("   計算耗時: {} ms", elapsed);
    }
    for warning in &report.warnings {
        println!("   ⚠ [{:?}] {} {}", warning.severity, warning.component_id, warning.message);
    }
    println!();
    println!("{}", serde_json::to_string_pretty(&report.summary)?);

    Ok(())
}

fn bom_table() -> RawTable {
    RawTable::new(&[
        "parent_id",
        "child_id",
        "qty_per_unit",
        "parent_description",
        "child_description",
    ])
    .with_row(&["BIKE", "FRAME", "1", "腳踏車", "車架"])
    .with_row(&["BIKE", "WHEEL", "2", "腳踏車", "輪組"])
    .with_row(&["BIKE", "SEAT", "1", "腳踏車", "座椅"])
    .with_row(&["SCOOTER", "WHEEL", "2", "滑板車", "輪組"])
    .with_row(&["SCOOTER", "DECK", "1", "滑板車", "踏板"])
    .with_row(&["FRAME", "TUBE", "3", "車架", "鋼管"])
    .with_row(&["FRAME", "PAINT", "0.5", "車架", "烤漆"])
    .with_row(&["WHEEL", "RIM", "1", "輪組", "輪圈"])
    .with_row(&["WHEEL", "SPOKE", "36", "輪組", "輻條"])
}

fn forecast_table() -> RawTable {
    RawTable::new(&PlanRow::REQUIRED)
        .with_row(&["BIKE", "2025", "1", "120"])
        .with_row(&["BIKE", "2025", "2", "150"])
        .with_row(&["BIKE", "2025", "3", "90"])
        .with_row(&["SCOOTER", "2025", "1", "60"])
        .with_row(&["SCOOTER", "2025", "2", "40"])
        .with_row(&["SCOOTER", "2025", "3", "80"])
}

fn supplier_table() -> RawTable {
    RawTable::new(&SupplierRow::REQUIRED)
        .with_row(&["TUBE", "SUP-STEEL", "3.5", "200", "20"])
        .with_row(&["SPOKE", "SUP-WIRE", "0.05", "2000", "10"])
        .with_row(&["RIM", "SUP-RIM", "12", "100", "25"])
        .with_row(&["SEAT", "SUP-SEAT", "18", "50", "14"])
}

fn inventory() -> anyhow::Result<InventoryBook> {
    let finished = RawTable::new(&InventoryRow::REQUIRED)
        .with_row(&["BIKE", "30"])
        .with_row(&["SCOOTER", "10"]);
    let raw = RawTable::new(&InventoryRow::REQUIRED)
        .with_row(&["SPOKE", "1500"])
        .with_row(&["TUBE", "120"]);
    let semi = RawTable::new(&InventoryRow::REQUIRED).with_row(&["WHEEL", "40"]);

    let mut book = InventoryBook::new();
    for (table, pool) in [
        (finished, InventoryPool::Finished),
        (raw, InventoryPool::Raw),
        (semi, InventoryPool::SemiFinished),
    ] {
        for row in InventoryRow::from_table(&table)? {
            book.insert(row.into_inventory(pool));
        }
    }
    Ok(book)
}
