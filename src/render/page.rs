//! Fixed page chrome: stylesheet, header, sections and footer.

use super::escape_html;
use super::rows::{CSV_HEADERS, GameRow};
use std::fmt::Write as _;

pub const STYLES: &str = r#"        * {
            margin: 0;
            padding: 0;
            box-sizing: border-box;
        }

        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI',
                         Roboto, 'Helvetica Neue', Arial, sans-serif;
            background-color: #f5f5f5;
            color: #333;
            line-height: 1.6;
        }

        .header {
            background: linear-gradient(135deg, #D00000 0%, #8B0000 100%);
            color: #FEFDFA;
            padding: 2rem 1rem;
            text-align: center;
            box-shadow: 0 2px 10px rgba(0,0,0,0.1);
        }

        .header h1 {
            font-size: 2.5rem;
            font-weight: 700;
            margin-bottom: 0.5rem;
            text-transform: uppercase;
            letter-spacing: 1px;
        }

        .header p {
            font-size: 1.1rem;
            opacity: 0.95;
        }

        .container {
            max-width: 1400px;
            margin: 0 auto;
            padding: 2rem 1rem;
        }

        .sport-section {
            background: white;
            margin-bottom: 3rem;
            border-radius: 8px;
            box-shadow: 0 2px 8px rgba(0,0,0,0.1);
            overflow: hidden;
        }

        .sport-header {
            background-color: #D00000;
            color: #FEFDFA;
            padding: 1.5rem;
            border-bottom: 4px solid #8B0000;
        }

        .sport-header h2 {
            font-size: 1.8rem;
            font-weight: 700;
            text-transform: uppercase;
            letter-spacing: 0.5px;
        }

        .table-container {
            overflow-x: auto;
            padding: 1rem;
        }

        table {
            width: 100%;
            border-collapse: collapse;
            font-size: 0.95rem;
        }

        thead {
            background-color: #FEFDFA;
            border-bottom: 2px solid #D00000;
        }

        th {
            padding: 1rem 0.75rem;
            text-align: left;
            font-weight: 700;
            color: #D00000;
            text-transform: uppercase;
            font-size: 0.85rem;
            letter-spacing: 0.5px;
            white-space: nowrap;
        }

        td {
            padding: 0.9rem 0.75rem;
            border-bottom: 1px solid #e0e0e0;
        }

        tbody tr {
            transition: background-color 0.2s;
        }

        tbody tr:hover {
            background-color: #f9f9f9;
        }

        .game-completed {
            background-color: #f8f8f8;
        }

        .game-upcoming {
            background-color: white;
            font-weight: 500;
        }

        .result-win {
            color: #28a745;
            font-weight: 700;
        }

        .result-loss {
            color: #dc3545;
            font-weight: 700;
        }

        .result-upcoming {
            color: #6c757d;
            font-style: italic;
        }

        .home-game {
            border-left: 4px solid #D00000;
        }

        .away-game {
            border-left: 4px solid #666;
        }

        .neutral-game {
            border-left: 4px solid #0066cc;
        }

        .watch-channel {
            background-color: #D00000;
            color: white;
            padding: 0.25rem 0.5rem;
            border-radius: 4px;
            font-size: 0.85rem;
            font-weight: 600;
            display: inline-block;
        }

        .event-badge {
            background-color: #FEFDFA;
            color: #D00000;
            border: 1px solid #D00000;
            padding: 0.25rem 0.5rem;
            border-radius: 4px;
            font-size: 0.8rem;
            font-weight: 600;
            display: inline-block;
        }

        .note-section {
            padding: 1rem 1.5rem;
            background-color: #fff3cd;
            border-left: 4px solid #ffc107;
            margin: 1rem;
            border-radius: 4px;
        }

        .note-section p {
            color: #856404;
            margin: 0.25rem 0;
        }

        .footer {
            text-align: center;
            padding: 2rem 1rem;
            color: #666;
            font-size: 0.9rem;
        }

        .last-updated {
            background-color: #D00000;
            color: #FEFDFA;
            padding: 0.5rem 1rem;
            text-align: center;
            font-size: 0.9rem;
        }

        @media (max-width: 768px) {
            .header h1 {
                font-size: 1.8rem;
            }

            .sport-header h2 {
                font-size: 1.4rem;
            }

            table {
                font-size: 0.85rem;
            }

            th, td {
                padding: 0.6rem 0.4rem;
            }

            th {
                font-size: 0.75rem;
            }
        }

        @media (max-width: 480px) {
            .header h1 {
                font-size: 1.5rem;
            }

            .container {
                padding: 1rem 0.5rem;
            }

            .table-container {
                padding: 0.5rem;
            }
        }
"#;

pub const PLACEHOLDER_TITLE: &str = "Schedule not yet available";
pub const PLACEHOLDER_DETAIL: &str = "Check back later for updates";

/// Everything up to and including the opening of the sections container.
pub fn document_head(year: i32, last_updated: &str) -> String {
    let season = format!("{year}-{}", year + 1);
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("    <meta charset=\"UTF-8\">\n");
    html.push_str(
        "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    let _ = writeln!(
        html,
        "    <title>Nebraska Cornhuskers Sports Schedules | {season}</title>"
    );
    html.push_str("    <style>\n");
    html.push_str(STYLES);
    html.push_str("    </style>\n</head>\n<body>\n");
    html.push_str("    <div class=\"header\">\n");
    html.push_str("        <h1>🌽 Nebraska Cornhuskers</h1>\n");
    let _ = writeln!(
        html,
        "        <p>Complete Sports Schedules | {season} Season</p>"
    );
    html.push_str("    </div>\n\n");
    html.push_str("    <div class=\"last-updated\">\n");
    let _ = writeln!(html, "        Last Updated: {last_updated}");
    html.push_str("    </div>\n\n");
    html.push_str("    <div class=\"container\">\n");
    html
}

pub fn document_foot(year: i32) -> String {
    format!(
        "    </div>\n\n    <div class=\"footer\">\n        <p><strong>Go Big Red!</strong></p>\n        <p>For official updates, visit <strong>huskers.com</strong></p>\n        <p>&copy; {year} Nebraska Cornhuskers Athletics</p>\n    </div>\n</body>\n</html>\n"
    )
}

fn section_open(sport_name: &str, emoji: &str) -> String {
    let heading = if emoji.is_empty() {
        escape_html(sport_name)
    } else {
        format!("{emoji} {}", escape_html(sport_name))
    };
    // "--" is not allowed inside an HTML comment
    let comment = escape_html(&sport_name.to_uppercase()).replace("--", "- -");
    format!(
        "        <!-- {comment} -->\n        <section class=\"sport-section\">\n            <div class=\"sport-header\">\n                <h2>{heading}</h2>\n            </div>\n"
    )
}

const SECTION_CLOSE: &str = "        </section>\n\n";

/// Section shown when a sport has no usable schedule file.
pub fn placeholder_section(sport_name: &str, emoji: &str) -> String {
    let mut html = section_open(sport_name, emoji);
    html.push_str("            <div class=\"note-section\">\n");
    let _ = writeln!(
        html,
        "                <p><strong>{PLACEHOLDER_TITLE}</strong></p>"
    );
    let _ = writeln!(html, "                <p>{PLACEHOLDER_DETAIL}</p>");
    html.push_str("            </div>\n");
    html.push_str(SECTION_CLOSE);
    html
}

pub fn table_section(sport_name: &str, emoji: &str, games: &[GameRow]) -> String {
    let mut html = section_open(sport_name, emoji);
    html.push_str("            <div class=\"table-container\">\n");
    html.push_str("                <table>\n");
    html.push_str("                    <thead>\n");
    html.push_str("                        <tr>\n");
    for header in CSV_HEADERS {
        let _ = writeln!(html, "                            <th>{header}</th>");
    }
    html.push_str("                        </tr>\n");
    html.push_str("                    </thead>\n");
    html.push_str("                    <tbody>\n");
    for game in games {
        html.push_str(&game.to_html());
    }
    html.push_str("                    </tbody>\n");
    html.push_str("                </table>\n");
    html.push_str("            </div>\n");
    html.push_str(SECTION_CLOSE);
    html
}
