use crate::models::CatalogMovie;

/// Orders movies by descending popularity
///
/// The sort is stable, so movies with equal popularity keep the catalog's
/// relevance order. The input is left untouched.
pub fn rank_by_popularity(movies: &[CatalogMovie]) -> Vec<CatalogMovie> {
    let mut ranked = movies.to_vec();
    ranked.sort_by(|a, b| b.popularity.total_cmp(&a.popularity));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: i64, popularity: f64) -> CatalogMovie {
        CatalogMovie {
            id,
            title: format!("Movie {}", id),
            overview: None,
            poster_path: None,
            release_date: None,
            popularity,
        }
    }

    fn ids(movies: &[CatalogMovie]) -> Vec<i64> {
        movies.iter().map(|m| m.id).collect()
    }

    #[test]
    fn test_orders_by_descending_popularity() {
        let raw = vec![movie(1, 10.0), movie(2, 50.0), movie(3, 20.0)];
        let ranked = rank_by_popularity(&raw);
        assert_eq!(ids(&ranked), vec![2, 3, 1]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let raw = vec![
            movie(1, 5.0),
            movie(2, 9.0),
            movie(3, 5.0),
            movie(4, 9.0),
            movie(5, 5.0),
        ];
        let ranked = rank_by_popularity(&raw);
        assert_eq!(ids(&ranked), vec![2, 4, 1, 3, 5]);
    }

    #[test]
    fn test_output_is_non_increasing() {
        let raw: Vec<CatalogMovie> = [3.5, 0.0, 120.25, 7.0, 7.0, 88.1, 0.5]
            .iter()
            .enumerate()
            .map(|(i, p)| movie(i as i64, *p))
            .collect();

        let ranked = rank_by_popularity(&raw);
        assert_eq!(ranked.len(), raw.len());
        assert!(ranked
            .windows(2)
            .all(|pair| pair[0].popularity >= pair[1].popularity));
    }

    #[test]
    fn test_input_is_not_mutated() {
        let raw = vec![movie(1, 10.0), movie(2, 50.0)];
        let before = raw.clone();
        let _ = rank_by_popularity(&raw);
        assert_eq!(raw, before);
    }

    #[test]
    fn test_empty_input() {
        assert!(rank_by_popularity(&[]).is_empty());
    }
}
