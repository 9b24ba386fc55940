//! HTML rendering for the server-side pages
//!
//! Every value taken from an event or a request is escaped with
//! [`escape_html`] before it is written into markup.

use std::fmt::Write;

use crate::models::Event;

/// Outcome of a booking attempt shown above the booking form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Booked,
    Failed(String),
}

/// Everything the details page shows
#[derive(Debug, Clone)]
pub struct EventPage<'a> {
    pub event: &'a Event,
    pub bookings: i64,
    pub similar: &'a [Event],
    pub notice: Option<Notice>,
}

/// Escape text for use in element content and quoted attribute values
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | DevEvent</title>
</head>
<body>
<header><nav><a href="/">DevEvent</a></nav></header>
<main>
{body}
</main>
</body>
</html>
"#,
        title = escape_html(title),
        body = body,
    )
}

fn event_card(event: &Event) -> String {
    format!(
        r#"<article class="event-card">
<a href="/events/{slug}">
<img src="{image}" alt="{title}" class="poster">
<p class="location">{location}</p>
<p class="title">{title}</p>
<div class="datetime"><span>{date}</span> <span>{time}</span></div>
</a>
</article>"#,
        slug = escape_html(&event.slug),
        image = escape_html(&event.image),
        title = escape_html(&event.title),
        location = escape_html(&event.location),
        date = escape_html(&event.date),
        time = escape_html(&event.time),
    )
}

fn event_list(events: &[Event]) -> String {
    let mut out = String::from(r#"<ul class="events">"#);
    for event in events {
        let _ = write!(out, r#"<li>{}</li>"#, event_card(event));
    }
    out.push_str("</ul>");
    out
}

/// Home page listing every event, newest first
pub fn render_home(events: &[Event]) -> String {
    let listing = if events.is_empty() {
        r#"<p class="empty">No events yet. Check back soon.</p>"#.to_string()
    } else {
        event_list(events)
    };

    let body = format!(
        r#"<section>
<h1>The Hub For Every Dev <br> Event You Can't Miss</h1>
<p>Hackathons, Meetups, and Conferences, All in One Place</p>
<h3 id="events">Featured Events</h3>
{listing}
</section>"#
    );

    layout("Home", &body)
}

fn detail_item(label: &str, value: &str) -> String {
    format!(
        r#"<div class="detail"><span class="label">{}</span> <p>{}</p></div>"#,
        escape_html(label),
        escape_html(value)
    )
}

fn notice_html(notice: &Option<Notice>) -> String {
    match notice {
        Some(Notice::Booked) => {
            r#"<p class="notice success">Thank you for signing up!</p>"#.to_string()
        },
        Some(Notice::Failed(message)) => {
            format!(r#"<p class="notice error">{}</p>"#, escape_html(message))
        },
        None => String::new(),
    }
}

fn booking_card(page: &EventPage<'_>) -> String {
    let headline = if page.bookings > 0 {
        format!(
            "Join {} people who have already booked their spot!",
            page.bookings
        )
    } else {
        "Be the first to book your spot!".to_string()
    };

    let form = if page.notice == Some(Notice::Booked) {
        String::new()
    } else {
        format!(
            r#"<form method="post" action="/events/{slug}/book">
<label for="email">Email Address</label>
<input type="email" id="email" name="email" placeholder="Enter your email address" required>
<button type="submit">Submit</button>
</form>"#,
            slug = escape_html(&page.event.slug)
        )
    };

    format!(
        r#"<aside class="booking">
<div class="signup-card">
<h2>Book Your Spot</h2>
<p class="text-sm">{headline}</p>
{notice}
{form}
</div>
</aside>"#,
        headline = escape_html(&headline),
        notice = notice_html(&page.notice),
        form = form,
    )
}

/// Details page for a single event
pub fn render_event(page: &EventPage<'_>) -> String {
    let event = page.event;

    let mut agenda = String::new();
    for item in &event.agenda {
        let _ = write!(agenda, "<li>{}</li>", escape_html(item));
    }

    let mut tags = String::new();
    for tag in &event.tags {
        let _ = write!(tags, r#"<span class="pill">{}</span>"#, escape_html(tag));
    }

    let similar = if page.similar.is_empty() {
        r#"<p class="empty">No similar events found.</p>"#.to_string()
    } else {
        event_list(page.similar)
    };

    let details = [
        detail_item("Date", &event.date),
        detail_item("Time", &event.time),
        detail_item("Venue", &event.venue),
        detail_item("Location", &event.location),
        detail_item("Mode", event.mode.as_str()),
        detail_item("Audience", &event.audience),
    ]
    .join("\n");

    let body = format!(
        r#"<section id="event">
<div class="header">
<h1>{title}</h1>
<p>{description}</p>
</div>
<div class="details">
<div class="content">
<img src="{image}" alt="Event Banner" class="banner">
<section><h2>Overview</h2><p>{overview}</p></section>
<section><h2>Event Details</h2>
{details}
</section>
<div class="agenda"><h2>Agenda</h2><ul>{agenda}</ul></div>
<section><h2>About the Organizer</h2><p>{organizer}</p></section>
<div class="tags">{tags}</div>
</div>
{booking}
</div>
<div class="similar">
<h2>Similar Events</h2>
{similar}
</div>
</section>"#,
        title = escape_html(&event.title),
        description = escape_html(&event.description),
        image = escape_html(&event.image),
        overview = escape_html(&event.overview),
        details = details,
        agenda = agenda,
        organizer = escape_html(&event.organizer),
        tags = tags,
        booking = booking_card(page),
        similar = similar,
    );

    layout(&event.title, &body)
}

/// Page shown when a slug does not resolve
pub fn render_not_found(slug: &str) -> String {
    let body = format!(
        r#"<section class="not-found">
<h1>Event not found</h1>
<p>No event matches "{}".</p>
<p><a href="/">Browse all events</a></p>
</section>"#,
        escape_html(slug)
    );
    layout("Not found", &body)
}

/// Generic failure page
pub fn render_error(message: &str) -> String {
    let body = format!(
        r#"<section class="error">
<h1>Something went wrong</h1>
<p>{}</p>
</section>"#,
        escape_html(message)
    );
    layout("Error", &body)
}
