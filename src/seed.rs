//! Sample catalogue loaded on startup.

use chrono::{Duration, NaiveDate, Utc};
use tracing::info;

use crate::database::Database;

pub struct SampleMovie {
    pub title: &'static str,
    pub description: &'static str,
    pub duration_minutes: i64,
    pub genre: &'static str,
    pub poster_url: &'static str,
}

pub const SAMPLE_MOVIES: &[SampleMovie] = &[
    SampleMovie {
        title: "Inception",
        description: "A thief who steals corporate secrets through the use of dream-sharing technology.",
        duration_minutes: 148,
        genre: "Sci-Fi",
        poster_url: "https://image.tmdb.org/t/p/w500/edv5CZvWj09upOsy2Y6IwDhK8bt.jpg",
    },
    SampleMovie {
        title: "The Dark Knight",
        description: "When the menace known as the Joker wreaks havoc and chaos on the people of Gotham.",
        duration_minutes: 152,
        genre: "Action",
        poster_url: "https://image.tmdb.org/t/p/w500/qJ2tW6WMUDux911r6m7haRef0WH.jpg",
    },
    SampleMovie {
        title: "Interstellar",
        description: "A team of explorers travel through a wormhole in space in an attempt to ensure humanity's survival.",
        duration_minutes: 169,
        genre: "Sci-Fi",
        poster_url: "https://image.tmdb.org/t/p/w500/gEU2QniE6E77NI6lCU6MxlNBvIx.jpg",
    },
    SampleMovie {
        title: "Parasite",
        description: "Greed and class discrimination threaten the newly formed symbiotic relationship between the wealthy Park family and the destitute Kim clan.",
        duration_minutes: 132,
        genre: "Thriller",
        poster_url: "https://image.tmdb.org/t/p/w500/7IiTTgloJzvGI1TAYymCfbfl3vT.jpg",
    },
    SampleMovie {
        title: "Avengers: Endgame",
        description: "The Avengers assemble once more to reverse Thanos' actions and restore balance to the universe.",
        duration_minutes: 181,
        genre: "Action",
        poster_url: "https://image.tmdb.org/t/p/w500/or06FN3Dka5tukK1e9sl16pB3iy.jpg",
    },
    SampleMovie {
        title: "La La Land",
        description: "A jazz pianist and an aspiring actress fall in love while pursuing their dreams in Los Angeles.",
        duration_minutes: 128,
        genre: "Drama",
        poster_url: "https://image.tmdb.org/t/p/w500/uDO8zWDhfWwoFdKS4fzkUJt0Rf0.jpg",
    },
    SampleMovie {
        title: "Joker",
        description: "Arthur Fleck, a party clown, leads an impoverished life with his ailing mother.",
        duration_minutes: 122,
        genre: "Thriller",
        poster_url: "https://image.tmdb.org/t/p/w500/udDclJoHjfjb8Ekgsd4FDteOkCU.jpg",
    },
    SampleMovie {
        title: "Spider-Man: Into the Spider-Verse",
        description: "Teen Miles Morales becomes Spider-Man and joins counterparts from other dimensions to save the multiverse.",
        duration_minutes: 117,
        genre: "Action",
        poster_url: "https://image.tmdb.org/t/p/w500/iiZZdoQBEYBv6id8su7ImL0oCbD.jpg",
    },
    SampleMovie {
        title: "Dune: Part Two",
        description: "Paul Atreides unites with the Fremen to wage war and exact revenge against House Harkonnen.",
        duration_minutes: 166,
        genre: "Sci-Fi",
        poster_url: "https://image.tmdb.org/t/p/w500/1pdfLvkbY9ohJlCjQH2CZjjYVvJ.jpg",
    },
    SampleMovie {
        title: "Mad Max: Fury Road",
        description: "In a post-apocalyptic wasteland, Max teams up with Furiosa to flee a tyrant and his army.",
        duration_minutes: 120,
        genre: "Action",
        poster_url: "https://image.tmdb.org/t/p/w500/8tZYtuWezp8JbcsvHYO0O46tFbo.jpg",
    },
];

/// Daily screening slots as (day offset from today, time).
const SCREENINGS: [(i64, &str); 3] = [(0, "18:00"), (0, "21:00"), (1, "19:00")];

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub movies_upserted: usize,
    pub movies_retired: usize,
    pub showtimes_created: usize,
}

/// Brings the catalogue in line with [`SAMPLE_MOVIES`]. Safe to run on every
/// startup: existing movies are updated by title and only movies without any
/// showtime get new ones.
pub async fn seed_sample_data(
    db: &Database,
    retired_titles: &[String],
) -> Result<SeedReport, sqlx::Error> {
    let mut report = SeedReport::default();
    let mut tx = db.begin_write().await?;

    for movie in SAMPLE_MOVIES {
        if retired_titles.iter().any(|title| title == movie.title) {
            continue;
        }
        sqlx::query(
            "INSERT OR IGNORE INTO movies (title, description, duration_minutes, genre, poster_url)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(movie.title)
        .bind(movie.description)
        .bind(movie.duration_minutes)
        .bind(movie.genre)
        .bind(movie.poster_url)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE movies SET description = $1, duration_minutes = $2, genre = $3, poster_url = $4
             WHERE title = $5",
        )
        .bind(movie.description)
        .bind(movie.duration_minutes)
        .bind(movie.genre)
        .bind(movie.poster_url)
        .bind(movie.title)
        .execute(&mut *tx)
        .await?;

        report.movies_upserted += 1;
    }
    info!("Sample movies ensured ({})", report.movies_upserted);

    for title in retired_titles {
        let movie_id: Option<i64> =
            sqlx::query_scalar("SELECT id FROM movies WHERE title = $1")
                .bind(title)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(movie_id) = movie_id else {
            continue;
        };

        // Children first, the schema enforces foreign keys.
        for statement in [
            "DELETE FROM bookings WHERE movie_id = $1",
            "DELETE FROM showtimes WHERE movie_id = $1",
            "DELETE FROM movies WHERE id = $1",
        ] {
            sqlx::query(statement).bind(movie_id).execute(&mut *tx).await?;
        }
        report.movies_retired += 1;
        info!("Retired movie {:?} (id {})", title, movie_id);
    }

    let without_showtimes: Vec<i64> = sqlx::query_scalar(
        r#"
        SELECT m.id FROM movies m
        LEFT JOIN showtimes s ON s.movie_id = m.id
        GROUP BY m.id
        HAVING COUNT(s.id) = 0
        ORDER BY m.id
        "#,
    )
    .fetch_all(&mut *tx)
    .await?;

    let today = Utc::now().date_naive();
    for movie_id in &without_showtimes {
        for slot in screening_slots(today) {
            sqlx::query("INSERT INTO showtimes (movie_id, showtime_datetime) VALUES ($1, $2)")
                .bind(*movie_id)
                .bind(slot)
                .execute(&mut *tx)
                .await?;
            report.showtimes_created += 1;
        }
    }

    tx.commit().await?;

    if report.showtimes_created == 0 {
        info!("Showtimes already seeded");
    } else {
        info!(
            "Seeded {} showtimes for {} movies",
            report.showtimes_created,
            without_showtimes.len()
        );
    }
    Ok(report)
}

/// `YYYY-MM-DD HH:MM` screening times starting from `today`.
pub fn screening_slots(today: NaiveDate) -> Vec<String> {
    SCREENINGS
        .iter()
        .map(|(offset, time)| {
            let day = today + Duration::days(*offset);
            format!("{} {}", day.format("%Y-%m-%d"), time)
        })
        .collect()
}
