//! Russian display labels for catalog codes.
//!
//! Every helper returns the code itself when it has no label for it, so a
//! value the upstream adds later still renders as something.

/// Airing status, e.g. `ongoing` → `Онгоинг`.
pub fn status_label(code: &str) -> &str {
    match code {
        "released" => "Вышел",
        "ongoing" => "Онгоинг",
        "anons" => "Анонс",
        _ => code,
    }
}

pub fn kind_label(code: &str) -> &str {
    match code {
        "tv" => "ТВ-Сериал",
        "tv_special" => "ТВ-Спешл",
        "movie" => "Фильм",
        "ova" => "OVA",
        "ona" => "ONA",
        "special" => "Спешл",
        "music" => "Клип",
        "cm" => "Реклама",
        "pv" => "Промо",
        _ => code,
    }
}

/// Compact age rating, e.g. `pg_13` → `13+`.
pub fn rating_label(code: &str) -> &str {
    match code {
        "g" => "0+",
        "pg" => "6+",
        "pg_13" => "13+",
        "r" => "16+",
        "r_plus" => "18+",
        "rx" => "18+ (Хентай)",
        _ => code,
    }
}

/// Age rating with its audience, for filter pickers.
pub fn rating_label_full(code: &str) -> &str {
    match code {
        "g" => "G (0+) — Для всех",
        "pg" => "PG (6+) — Детям",
        "pg_13" => "PG-13 (13+) — Подросткам",
        "r" => "R (16+) — 16+",
        "r_plus" => "R+ (18+) — Взрослым",
        "none" => "Без рейтинга",
        _ => code,
    }
}

/// Completes the phrase "Сортировать по ...".
pub fn sort_by_label(code: &str) -> &str {
    match code {
        "score" => "Рейтингу",
        "aired_on" => "Дате выхода",
        "russian" => "Названию",
        _ => code,
    }
}
