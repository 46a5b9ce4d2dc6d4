use serde::{Deserialize, Serialize};

/// Seeded streaming platforms, in seed order: (name, icon URL)
///
/// The names double as the allow-list matched against TMDB provider names.
pub const KNOWN_SERVICES: [(&str, &str); 10] = [
    (
        "Amazon Prime Video",
        "https://image.tmdb.org/t/p/original/dQeAar5H991VYporEjUspolDarG.jpg",
    ),
    (
        "Netflix",
        "https://image.tmdb.org/t/p/original/pbpMk2JmcoNnQwx5JGpXngfoWtp.jpg",
    ),
    (
        "Disney Plus",
        "https://image.tmdb.org/t/p/original/97yvRBw1GzX7fXprcF80er19ot.jpg",
    ),
    (
        "HBO Max",
        "https://image.tmdb.org/t/p/original/fksCUZ9QDWZMUwL2LgMtLckROUN.jpg",
    ),
    (
        "Hulu",
        "https://image.tmdb.org/t/p/original/bxBlRPEPpMVDc4jMhSrTf2339DW.jpg",
    ),
    (
        "Peacock Premium",
        "https://image.tmdb.org/t/p/original/2aGrp1xw3qhwCYvNGAJZPdjfeeX.jpg",
    ),
    (
        "Paramount Plus",
        "https://image.tmdb.org/t/p/original/h5DcR0J2EESLitnhR8xLG1QymTE.jpg",
    ),
    (
        "Starz",
        "https://image.tmdb.org/t/p/original/yIKwylTLP1u8gl84Is7FItpYLGL.jpg",
    ),
    (
        "Showtime",
        "https://image.tmdb.org/t/p/original/kkUHFtdjasnnOknZN69TbZ2fCTh.jpg",
    ),
    (
        "Apple TV Plus",
        "https://image.tmdb.org/t/p/original/2E03IAZsX4ZaUqM7tXlctEPMGWS.jpg",
    ),
];

/// Returns true if `provider_name` is one of the seeded services
pub fn is_known_service(provider_name: &str) -> bool {
    KNOWN_SERVICES.iter().any(|(name, _)| *name == provider_name)
}

/// A streaming platform row. Read-only at runtime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct Service {
    /// Local numeric key
    pub id: i32,
    /// Name of the streaming service (e.g., "Netflix", "Hulu")
    pub name: String,
    pub icon_url: String,
}

/// What the watchlist view renders for an owned service
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ServiceIcon {
    pub service_id: i32,
    pub name: String,
    pub icon_url: String,
}

impl From<&Service> for ServiceIcon {
    fn from(service: &Service) -> Self {
        Self {
            service_id: service.id,
            name: service.name.clone(),
            icon_url: service.icon_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_service_exact_match() {
        assert!(is_known_service("Netflix"));
        assert!(is_known_service("Peacock Premium"));
        assert!(!is_known_service("netflix"));
        assert!(!is_known_service("Netflix basic with Ads"));
    }

    #[test]
    fn test_known_services_are_unique() {
        let mut names: Vec<&str> = KNOWN_SERVICES.iter().map(|(name, _)| *name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), KNOWN_SERVICES.len());
    }

    #[test]
    fn test_icon_from_service() {
        let service = Service {
            id: 2,
            name: "Netflix".to_string(),
            icon_url: "https://example.test/n.jpg".to_string(),
        };
        let icon = ServiceIcon::from(&service);
        assert_eq!(icon.service_id, 2);
        assert_eq!(icon.name, "Netflix");
    }
}
