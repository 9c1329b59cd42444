/// 경매 조회
pub const GET_AUCTION: &str = "SELECT id, item_id, kind, starting_price, start_date, end_date, status, sold_value, manager_id FROM auctions WHERE id = $1";

/// 경매 목록 조회 (상품 조건은 선택)
pub const LIST_AUCTIONS: &str = r#"
    SELECT id, item_id, kind, starting_price, start_date, end_date, status, sold_value, manager_id
    FROM auctions
    WHERE ($1::BIGINT IS NULL OR item_id = $1)
    ORDER BY id
"#;

/// 경매 생성
pub const INSERT_AUCTION: &str = r#"
    INSERT INTO auctions (item_id, kind, starting_price, start_date, end_date, status, sold_value, manager_id)
    VALUES ($1, $2, $3, $4, $5, 'Pending', 0, $6)
    RETURNING id, item_id, kind, starting_price, start_date, end_date, status, sold_value, manager_id
"#;

/// 경매 상태 변경 (읽었을 때의 상태와 같을 때만)
pub const UPDATE_AUCTION_STATUS: &str = r#"
    UPDATE auctions
    SET status = $1, sold_value = COALESCE($2::NUMERIC, sold_value)
    WHERE id = $3 AND status = $4
"#;

/// 상품 조회
pub const GET_ITEM: &str = r#"
    SELECT i.id, i.name, i.url, i.description, i.manager_id, i.status,
           COALESCE(ARRAY_AGG(ic.category_id ORDER BY ic.category_id)
                    FILTER (WHERE ic.category_id IS NOT NULL), '{}') AS category_ids
    FROM items i
    LEFT JOIN item_categories ic ON ic.item_id = i.id
    WHERE i.id = $1
    GROUP BY i.id
"#;

/// 모든 상품 조회
pub const LIST_ITEMS: &str = r#"
    SELECT i.id, i.name, i.url, i.description, i.manager_id, i.status,
           COALESCE(ARRAY_AGG(ic.category_id ORDER BY ic.category_id)
                    FILTER (WHERE ic.category_id IS NOT NULL), '{}') AS category_ids
    FROM items i
    LEFT JOIN item_categories ic ON ic.item_id = i.id
    GROUP BY i.id
    ORDER BY i.id
"#;

/// 상품 상태 변경 (읽었을 때의 상태와 같을 때만)
pub const UPDATE_ITEM_STATUS: &str = "UPDATE items SET status = $1 WHERE id = $2 AND status = $3";

/// 매니저 조회
pub const GET_MANAGER: &str = "SELECT id, name FROM managers WHERE id = $1";

/// 모든 카테고리 조회
pub const LIST_CATEGORIES: &str = "SELECT id, name FROM categories ORDER BY id";
