use std::str::FromStr;

/// Content types managed through the dashboards. Every kind shares the
/// same list/detail/create/update/delete shape under its collection path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Events,
    Carousel,
    Gallery,
    AboutUs,
    CorporateServices,
    EntertainmentServices,
    ConcertServices,
    SeminarServices,
    Participants,
}

impl ContentKind {
    pub const ALL: [ContentKind; 9] = [
        ContentKind::Events,
        ContentKind::Carousel,
        ContentKind::Gallery,
        ContentKind::AboutUs,
        ContentKind::CorporateServices,
        ContentKind::EntertainmentServices,
        ContentKind::ConcertServices,
        ContentKind::SeminarServices,
        ContentKind::Participants,
    ];

    /// Collection path, with trailing slash
    pub fn collection_path(&self) -> &'static str {
        match self {
            ContentKind::Events => "/api/events/",
            ContentKind::Carousel => "/api/carousel/",
            ContentKind::Gallery => "/api/gallery/",
            ContentKind::AboutUs => "/api/about-us/",
            ContentKind::CorporateServices => "/api/services/corporate/",
            ContentKind::EntertainmentServices => "/api/services/entertainment/",
            ContentKind::ConcertServices => "/api/services/concert/",
            ContentKind::SeminarServices => "/api/services/seminar/",
            ContentKind::Participants => "/api/participants/",
        }
    }

    pub fn item_path(&self, id: &str) -> String {
        format!("{}{}/", self.collection_path(), id)
    }

    /// Short name used on the command line
    pub fn slug(&self) -> &'static str {
        match self {
            ContentKind::Events => "events",
            ContentKind::Carousel => "carousel",
            ContentKind::Gallery => "gallery",
            ContentKind::AboutUs => "about-us",
            ContentKind::CorporateServices => "corporate",
            ContentKind::EntertainmentServices => "entertainment",
            ContentKind::ConcertServices => "concert",
            ContentKind::SeminarServices => "seminar",
            ContentKind::Participants => "participants",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContentKind::Events => "Events",
            ContentKind::Carousel => "Carousel",
            ContentKind::Gallery => "Gallery",
            ContentKind::AboutUs => "About Us",
            ContentKind::CorporateServices => "Corporate Services",
            ContentKind::EntertainmentServices => "Entertainment Services",
            ContentKind::ConcertServices => "Concert Services",
            ContentKind::SeminarServices => "Seminar Services",
            ContentKind::Participants => "Participants",
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ContentKind::ALL
            .iter()
            .copied()
            .find(|k| k.slug() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = ContentKind::ALL.iter().map(|k| k.slug()).collect();
                format!("unknown content type '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}
