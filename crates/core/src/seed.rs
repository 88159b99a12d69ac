//! Bundled sample dataset.
//!
//! Loaded when local storage holds no collection yet, or holds one that
//! cannot be parsed.

use chrono::NaiveDate;

use crate::commission::Commission;
use crate::status::CommissionStatus;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

#[allow(clippy::too_many_arguments)]
fn sample(
    id: &str,
    artist: &str,
    client_name: &str,
    title: &str,
    description: &str,
    commission_type: &str,
    price: f64,
    status: CommissionStatus,
    date_added: NaiveDate,
    last_updated: NaiveDate,
    thumbnail: &str,
) -> Commission {
    Commission {
        id: id.to_string(),
        artist_id: artist.to_string(),
        user_id: Some(artist.to_string()),
        client_name: client_name.to_string(),
        contact: None,
        title: title.to_string(),
        description: description.to_string(),
        commission_type: commission_type.to_string(),
        price,
        status,
        date_added,
        last_updated,
        thumbnail_url: Some(thumbnail.to_string()),
        notes: None,
    }
}

/// The four sample commissions shipped with the dashboard.
pub fn default_commissions() -> Vec<Commission> {
    vec![
        sample(
            "c-101",
            "兔兔老師",
            "星野光",
            "精靈遊俠頭像",
            "一張高精靈遊俠在雨中的憂鬱頭像。希望能強調眼神的光影和雨滴的氛圍感。",
            "大頭貼",
            1500.0,
            CommissionStatus::Render,
            date(2023, 10, 25),
            date(2023, 11, 2),
            "https://picsum.photos/400/400?random=1",
        ),
        sample(
            "c-102",
            "熊熊繪圖",
            "MomoChan",
            "賽博龐克街道背景",
            "細緻的霓虹燈巷弄背景，有一隻橘貓坐在垃圾桶上看著鏡頭。",
            "插畫",
            5000.0,
            CommissionStatus::Sketch,
            date(2023, 10, 28),
            date(2023, 10, 30),
            "https://picsum.photos/400/300?random=2",
        ),
        sample(
            "c-103",
            "兔兔老師",
            "鐵拳阿豪",
            "D&D 跑團角色全家福",
            "五個角色在酒館慶祝的場景。包含矮人戰士、人類法師、提夫林盜賊等。",
            "插畫",
            8000.0,
            CommissionStatus::Queue,
            date(2023, 11, 1),
            date(2023, 11, 1),
            "https://picsum.photos/400/250?random=3",
        ),
        sample(
            "c-104",
            "熊熊繪圖",
            "Viper007",
            "重裝機甲設定",
            "重型突擊機甲的概念設計圖。配色以叢林迷彩和鐵灰色為主。",
            "立繪設計",
            3500.0,
            CommissionStatus::LineArt,
            date(2023, 10, 20),
            date(2023, 10, 29),
            "https://picsum.photos/400/400?random=4",
        ),
    ]
}
