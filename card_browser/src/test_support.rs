//! Shared JSON fixtures for tests that mock the Pokemon TCG API.

pub fn set_json(id: &str, name: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "series": "Base",
        "printedTotal": 102,
        "total": 102,
        "releaseDate": "1999/01/09",
        "images": {
            "symbol": format!("https://images.pokemontcg.io/{id}/symbol.png"),
            "logo": format!("https://images.pokemontcg.io/{id}/logo.png")
        }
    })
}

pub fn card_json(id: &str, name: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "supertype": "Pokémon",
        "subtypes": ["Basic"],
        "hp": "60",
        "types": ["Lightning"],
        "number": "58",
        "rarity": "Common",
        "set": set_json("base1", "Base"),
        "images": {
            "small": format!("https://images.pokemontcg.io/base1/{id}.png"),
            "large": format!("https://images.pokemontcg.io/base1/{id}_hires.png")
        }
    })
}

/// A list response wrapping `data` with the paging fields filled in
pub fn page_json(data: Vec<serde_json::Value>, page: u32, page_size: u32, total: u32) -> serde_json::Value {
    serde_json::json!({
        "count": data.len(),
        "data": data,
        "page": page,
        "pageSize": page_size,
        "totalCount": total
    })
}

pub fn cards_page_json(page: u32, page_size: u32) -> serde_json::Value {
    page_json(
        vec![
            card_json("base1-58", "Pikachu"),
            card_json("base1-4", "Charizard"),
        ],
        page,
        page_size,
        102,
    )
}

pub fn sets_page_json(page: u32, page_size: u32) -> serde_json::Value {
    page_json(
        vec![set_json("base1", "Base"), set_json("base2", "Jungle")],
        page,
        page_size,
        2,
    )
}
