use crate::model::LayoutResult;
use serde_json::{Value, json};

/// File stem for the page at 0-based `index`: `page-1`, `page-2`, ...
pub fn page_name(index: usize) -> String {
    format!("page-{}", index + 1)
}

/// Serialize the whole result as `{ pages, meta }` (array-of-pages style).
/// Each page carries its name, size and placements in visual order.
pub fn to_json<K: ToString>(result: &LayoutResult<K>) -> Value {
    let pages_val = result
        .pages
        .iter()
        .map(|p| {
            let placements: Vec<Value> = p
                .placements
                .iter()
                .map(|pl| {
                    json!({
                        "id": pl.id.to_string(),
                        "x": pl.x,
                        "y": pl.y,
                        "width": pl.width,
                        "height": pl.height,
                    })
                })
                .collect();
            json!({
                "index": p.index,
                "name": page_name(p.index),
                "width": result.page_width,
                "height": result.page_height,
                "placements": placements,
            })
        })
        .collect::<Vec<_>>();
    json!({ "pages": pages_val, "meta": &result.meta })
}

/// Flatten placements keyed by image id, with the page each one landed on.
/// Shape: `{ placements: { id: { page, pageName, rect: {x, y, w, h} } }, pageSize, meta }`.
pub fn to_json_by_id<K: ToString>(result: &LayoutResult<K>) -> Value {
    let mut placements = serde_json::Map::new();
    for (page, pl) in result.placements() {
        placements.insert(
            pl.id.to_string(),
            json!({
                "page": page,
                "pageName": page_name(page),
                "rect": {"x": pl.x, "y": pl.y, "w": pl.width, "h": pl.height},
            }),
        );
    }
    json!({
        "placements": placements,
        "pageSize": {"w": result.page_width, "h": result.page_height},
        "meta": &result.meta,
    })
}
