use crate::features::toll_booths::models::{normalize_station, TollBooth};
use std::collections::HashMap;

/// 料金所名の候補と合計利用回数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationSuggestion {
    pub name: String,
    pub total_usage: u64,
}

/// 料金所名を利用回数の多い順に並べた候補を取得する
///
/// 入口・出口のどちらに現れる料金所も対象で、部分一致（大文字小文字を区別しない）で絞り込む。
/// 同じ料金所は1件にまとめ、利用回数はその料金所を含む全レコードの合計となる。
///
/// # 引数
/// * `booths` - 料金所レコード
/// * `query` - 検索文字列（空の場合は全件）
///
/// # 戻り値
/// 料金所名の候補（最初に現れた表記）
pub fn suggest(booths: &[TollBooth], query: &str) -> Vec<String> {
    rank_stations(booths, query)
        .into_iter()
        .map(|suggestion| suggestion.name)
        .collect()
}

/// 候補数の上限付きで料金所名を取得する
pub fn suggest_with_limit(booths: &[TollBooth], query: &str, limit: usize) -> Vec<String> {
    let mut names = suggest(booths, query);
    names.truncate(limit);
    names
}

/// 合計利用回数付きで候補を順位付けする
///
/// 利用回数が同じ場合は最初に現れた順を保つ。
/// 入口と出口が同じ料金所のレコードは1回だけ加算する。
pub fn rank_stations(booths: &[TollBooth], query: &str) -> Vec<StationSuggestion> {
    let needle = normalize_station(query);
    let mut ranked: Vec<StationSuggestion> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for booth in booths {
        let entry_key = normalize_station(&booth.entry_station);
        let exit_key = normalize_station(&booth.exit_station);
        let stations = [
            Some((&booth.entry_station, entry_key.clone())),
            (exit_key != entry_key).then_some((&booth.exit_station, exit_key)),
        ];

        for (station, key) in stations.into_iter().flatten() {
            if key.is_empty() || !key.contains(&needle) {
                continue;
            }

            match positions.get(&key) {
                Some(&index) => ranked[index].total_usage += u64::from(booth.usage_count),
                None => {
                    positions.insert(key, ranked.len());
                    ranked.push(StationSuggestion {
                        name: station.trim().to_string(),
                        total_usage: u64::from(booth.usage_count),
                    });
                }
            }
        }
    }

    // sort_byは安定ソート
    ranked.sort_by(|a, b| b.total_usage.cmp(&a.total_usage));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn booth(entry: &str, exit: &str, usage: u32) -> TollBooth {
        TollBooth {
            id: format!("{entry}-{exit}"),
            entry_station: entry.to_string(),
            exit_station: exit.to_string(),
            amount: dec!(4.00),
            usage_count: usage,
            last_used_at: "2024-03-01T08:00:00+01:00".to_string(),
        }
    }

    #[test]
    fn test_station_is_deduplicated_with_combined_usage() {
        let booths = vec![booth("Treviso", "Vicenza", 3), booth("Padova", "Treviso", 5)];

        let ranked = rank_stations(&booths, "tre");
        assert_eq!(
            ranked,
            vec![StationSuggestion {
                name: "Treviso".to_string(),
                total_usage: 8,
            }]
        );
        assert_eq!(suggest(&booths, "tre"), vec!["Treviso"]);
    }

    #[test]
    fn test_ordered_by_usage_descending() {
        let booths = vec![booth("Treviso", "Vicenza", 3), booth("Padova", "Treviso", 5)];

        // Treviso: 8, Padova: 5, Vicenza: 3
        assert_eq!(suggest(&booths, ""), vec!["Treviso", "Padova", "Vicenza"]);
        // "va"を含むのはPadovaのみ
        assert_eq!(suggest(&booths, "VA"), vec!["Padova"]);
    }

    #[test]
    fn test_ties_keep_first_appearance_order() {
        let booths = vec![booth("Mestre", "Padova Est", 2), booth("Verona", "Brescia", 2)];

        assert_eq!(
            suggest(&booths, ""),
            vec!["Mestre", "Padova Est", "Verona", "Brescia"]
        );
    }

    #[test]
    fn test_case_variants_are_one_station() {
        let booths = vec![booth("Treviso", "Vicenza", 1), booth("TREVISO", "Mestre", 1)];

        assert_eq!(suggest(&booths, "trev"), vec!["Treviso"]);
        assert_eq!(rank_stations(&booths, "trev")[0].total_usage, 2);
    }

    #[test]
    fn test_same_station_on_both_ends_counts_once() {
        let booths = vec![booth("Treviso", "TREVISO ", 3), booth("Padova", "Treviso", 2)];

        let ranked = rank_stations(&booths, "tre");
        assert_eq!(
            ranked,
            vec![StationSuggestion {
                name: "Treviso".to_string(),
                total_usage: 5,
            }]
        );
    }

    #[test]
    fn test_suggest_with_limit() {
        let booths = vec![booth("Treviso", "Vicenza", 3), booth("Padova", "Treviso", 5)];

        assert_eq!(suggest_with_limit(&booths, "", 2), vec!["Treviso", "Padova"]);
        assert!(suggest(&booths, "milano").is_empty());
    }
}
