//! Course inspection commands.

use aula_web::app::{CourseCard, CourseListView};
use aula_web::data::DataManager;

/// Log active courses, or completed ones with `archived`.
pub async fn list(data: &DataManager, archived: bool) {
    let courses = data.courses().await;
    let enrollments = data.enrollments().await;
    let view = CourseListView::new(&courses, &enrollments, archived);

    if view.cards.is_empty() {
        tracing::info!("{}", view.empty_message());
        return;
    }

    for card in &view.cards {
        tracing::info!("{}", summary(card));
    }
}

fn summary(card: &CourseCard) -> String {
    format!(
        "#{} {} | {} {} | {} | {}/{} partecipanti",
        card.id,
        card.title,
        card.date,
        card.start_time,
        card.instructor,
        card.enrolled,
        card.capacity
    )
}
