use crate::badges::ALL_BADGES;
use crate::dates;
use crate::models::{Goal, HistoryEntry, TrackingResponse};
use chrono::{Duration, NaiveDate};

const QUOTES: [(&str, &str); 10] = [
    ("Small steps daily beat rare sprints.", "Consistency"),
    ("You don't have to be perfect, just better than yesterday.", "Progress"),
    ("Discipline is choosing what you want now vs. what you want most.", "Discipline"),
    ("Action breeds motivation; start, then momentum follows.", "Momentum"),
    ("Win the day. Tomorrow starts here.", "Focus"),
    ("Your future self is quietly cheering for you.", "Self"),
    ("Streaks build identity. Identity sustains streaks.", "Identity"),
    ("Make it easy to start; hard to quit.", "Design"),
    ("Done today > perfect tomorrow.", "Bias to action"),
    ("Tiny wins compound into big outcomes.", "Compounding"),
];

/// Same quote all day: the date digits pick the entry.
pub fn quote_of_day(date_key: &str) -> String {
    let seed = date_key.replace('-', "").parse::<u64>().unwrap_or(0);
    let (quote, tag) = QUOTES[(seed % QUOTES.len() as u64) as usize];
    format!("\u{201c}{quote}\u{201d} — <em>{tag}</em>")
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn render_setup(goal: Option<&Goal>, today: NaiveDate) -> String {
    let today_key = dates::canonical_key(today);
    let default_deadline = dates::canonical_key(today + Duration::days(14));
    let (title, tasks, start, deadline, button) = match goal {
        Some(goal) => (
            escape(&goal.title),
            escape(&goal.tasks.join("\n")),
            goal.start_date.clone(),
            goal.deadline.clone(),
            if goal.completed { "Start again" } else { "Update" },
        ),
        None => (
            String::new(),
            String::new(),
            today_key.clone(),
            default_deadline,
            "Start",
        ),
    };

    shell(
        &SETUP_BODY
            .replace("{{QUOTE}}", &quote_of_day(&today_key))
            .replace("{{TITLE}}", &title)
            .replace("{{TASKS}}", &tasks)
            .replace("{{START}}", &start)
            .replace("{{DEADLINE}}", &deadline)
            .replace("{{BUTTON}}", button),
    )
}

pub fn render_tracking(view: &TrackingResponse, history: &[HistoryEntry]) -> String {
    let mut todos = String::new();
    for task in &view.tasks {
        let done_class = if task.checked { " done" } else { "" };
        todos.push_str(&format!(
            r#"<form class="todo{done_class}" method="post" action="/task/toggle">
  <input type="hidden" name="index" value="{index}" />
  <input type="hidden" name="checked" value="{next}" />
  <span class="title">{label}</span>
  <button type="submit" class="check" aria-label="toggle {label}">{mark}</button>
</form>
"#,
            index = task.index,
            next = !task.checked,
            label = escape(&task.label),
            mark = if task.checked { "✔" } else { "○" },
        ));
    }

    let mut badges = String::new();
    for def in &ALL_BADGES {
        let active = view.badges.contains(&def.id);
        badges.push_str(&format!(
            r#"<div class="badge" style="opacity:{opacity}" title="{tip}{locked}">{icon} {name}</div>
"#,
            opacity = if active { "1" } else { ".35" },
            tip = def.tip,
            locked = if active { "" } else { " (locked)" },
            icon = if active { "🏅" } else { "🔒" },
            name = def.name,
        ));
    }
    let badge_hint = match view.badges.len() {
        0 => "Earn badges by staying consistent".to_string(),
        1 => "Earned 1 badge".to_string(),
        n => format!("Earned {n} badges"),
    };

    let mut history_rows = String::new();
    if history.is_empty() {
        history_rows.push_str(r#"<div class="muted">No history yet.</div>"#);
    }
    for entry in history {
        let (tag_class, tag) = if entry.all_done {
            ("pill ok", "Completed")
        } else {
            ("pill miss", "Missed")
        };
        history_rows.push_str(&format!(
            r#"<div class="todo">
  <div>
    <div class="title">{date}</div>
    <small class="muted">{done}/{total} tasks · {pct}%</small>
  </div>
  <span class="{tag_class}">{tag}</span>
</div>
"#,
            date = entry.display_date,
            done = entry.completed_count,
            total = entry.total_count,
            pct = entry.percent,
        ));
    }

    shell(
        &TRACKING_BODY
            .replace("{{GOAL}}", &escape(&view.title))
            .replace("{{QUOTE}}", &quote_of_day(&view.date))
            .replace("{{DEADLINE}}", &view.deadline_display)
            .replace("{{STREAK}}", &view.streak.to_string())
            .replace("{{TODAY_PCT}}", &view.today_percent.to_string())
            .replace("{{OVERALL_PCT}}", &view.overall.percent.to_string())
            .replace("{{DONE_DAYS}}", &view.overall.done_days.to_string())
            .replace("{{TOTAL_DAYS}}", &view.overall.total_days.to_string())
            .replace("{{TODOS}}", &todos)
            .replace("{{BADGES}}", &badges)
            .replace("{{BADGE_HINT}}", &badge_hint)
            .replace("{{HISTORY}}", &history_rows),
    )
}

fn shell(body: &str) -> String {
    SHELL_HTML.replace("{{BODY}}", body)
}

const SHELL_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Goal Tracker</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #10172a;
      --bg-2: #1d2a4d;
      --ink: #e9edf6;
      --accent: #5eead4;
      --accent-2: #818cf8;
      --card: rgba(23, 32, 59, 0.88);
      --line: rgba(233, 237, 246, 0.12);
      --shadow: 0 24px 60px rgba(4, 8, 20, 0.5);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(160deg, var(--bg-1), #0b1120 70%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: start center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(760px, 100%);
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 26px;
      animation: rise 600ms ease;
    }

    header {
      display: flex;
      flex-direction: column;
      gap: 6px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      font-size: clamp(1.8rem, 4vw, 2.5rem);
      margin: 0;
    }

    h2 {
      margin: 0 0 10px;
      font-size: 1.15rem;
    }

    .quote {
      margin: 0;
      color: #9aa5c4;
      font-size: 0.98rem;
    }

    .pills {
      display: flex;
      flex-wrap: wrap;
      gap: 10px;
    }

    .pill {
      border: 1px solid var(--line);
      border-radius: 999px;
      padding: 6px 14px;
      font-size: 0.9rem;
      background: rgba(233, 237, 246, 0.05);
    }

    .pill.ok {
      background: rgba(34, 197, 94, 0.12);
      border-color: rgba(34, 197, 94, 0.35);
      color: #d1fae5;
    }

    .pill.miss {
      background: rgba(239, 68, 68, 0.12);
      border-color: rgba(239, 68, 68, 0.35);
      color: #ffe4e6;
    }

    label {
      display: grid;
      gap: 6px;
      font-size: 0.9rem;
      color: #9aa5c4;
    }

    input, textarea {
      background: rgba(9, 14, 30, 0.7);
      border: 1px solid var(--line);
      border-radius: 14px;
      color: var(--ink);
      font: inherit;
      padding: 12px 14px;
    }

    textarea {
      min-height: 110px;
      resize: vertical;
    }

    form.setup {
      display: grid;
      gap: 16px;
    }

    .row {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
      gap: 16px;
    }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 14px 20px;
      font-size: 1rem;
      font-weight: 600;
      cursor: pointer;
      transition: transform 150ms ease, box-shadow 150ms ease;
    }

    button:active {
      transform: scale(0.98);
    }

    .btn-primary {
      background: var(--accent);
      color: #06281f;
      box-shadow: 0 10px 24px rgba(94, 234, 212, 0.25);
    }

    .btn-secondary {
      background: var(--accent-2);
      color: #101331;
      box-shadow: 0 10px 24px rgba(129, 140, 248, 0.25);
    }

    .actions {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
      gap: 14px;
    }

    .todo {
      display: flex;
      align-items: center;
      justify-content: space-between;
      gap: 14px;
      background: rgba(9, 14, 30, 0.55);
      border: 1px solid var(--line);
      border-radius: 16px;
      padding: 13px 16px;
      margin: 0 0 10px;
    }

    .todo.done .title {
      text-decoration: line-through;
      color: #7f8aa8;
    }

    .todo .check {
      width: 42px;
      height: 42px;
      border-radius: 50%;
      padding: 0;
      font-size: 1.1rem;
      background: rgba(94, 234, 212, 0.15);
      color: var(--accent);
      border: 1px solid rgba(94, 234, 212, 0.4);
    }

    .bar {
      height: 12px;
      border-radius: 999px;
      background: rgba(9, 14, 30, 0.7);
      border: 1px solid var(--line);
      overflow: hidden;
    }

    .bar .fill {
      height: 100%;
      border-radius: 999px;
      background: linear-gradient(90deg, var(--accent), var(--accent-2));
    }

    .progress-line {
      display: flex;
      justify-content: space-between;
      font-size: 0.9rem;
      color: #9aa5c4;
      margin: 6px 0 8px;
    }

    .badges {
      display: flex;
      flex-wrap: wrap;
      gap: 10px;
    }

    .badge {
      border: 1px solid var(--line);
      border-radius: 999px;
      padding: 8px 14px;
      font-size: 0.9rem;
      background: rgba(233, 237, 246, 0.05);
    }

    .muted {
      color: #7f8aa8;
    }

    .hint {
      margin: 8px 0 0;
      color: #7f8aa8;
      font-size: 0.88rem;
    }

    @keyframes rise {
      from {
        opacity: 0;
        transform: translateY(18px);
      }
      to {
        opacity: 1;
        transform: translateY(0);
      }
    }

    @media (max-width: 600px) {
      .app {
        padding: 28px 22px;
      }
      button {
        width: 100%;
      }
    }
  </style>
</head>
<body>
  <main class="app">
{{BODY}}
  </main>
</body>
</html>
"#;

const SETUP_BODY: &str = r#"    <header>
      <h1>Set your goal</h1>
      <p class="quote">{{QUOTE}}</p>
    </header>

    <form class="setup" method="post" action="/goal">
      <label>Goal
        <input name="title" value="{{TITLE}}" placeholder="Ship the side project" required />
      </label>
      <label>Daily tasks (one per line)
        <textarea name="tasks" placeholder="Write for 30 minutes&#10;Review yesterday's work">{{TASKS}}</textarea>
      </label>
      <div class="row">
        <label>Start date
          <input type="date" name="start_date" value="{{START}}" />
        </label>
        <label>Deadline
          <input type="date" name="deadline" value="{{DEADLINE}}" required />
        </label>
      </div>
      <button class="btn-primary" type="submit">{{BUTTON}}</button>
    </form>
"#;

const TRACKING_BODY: &str = r#"    <header>
      <h1>{{GOAL}}</h1>
      <p class="quote">{{QUOTE}}</p>
      <div class="pills">
        <span class="pill">Deadline: {{DEADLINE}}</span>
        <span class="pill">🔥 Streak: {{STREAK}}</span>
      </div>
    </header>

    <section>
      <h2>Today's tasks</h2>
{{TODOS}}
      <div class="progress-line"><span>Today</span><span>{{TODAY_PCT}}%</span></div>
      <div class="bar"><div class="fill" style="width:{{TODAY_PCT}}%"></div></div>
    </section>

    <section class="actions">
      <form method="post" action="/mark-all">
        <button class="btn-primary" type="submit">Mark all done</button>
      </form>
      <form method="post" action="/complete">
        <button class="btn-secondary" type="submit">Complete goal</button>
      </form>
    </section>

    <section>
      <h2>Overall</h2>
      <div class="progress-line"><span>{{DONE_DAYS}}/{{TOTAL_DAYS}} days</span><span>{{OVERALL_PCT}}%</span></div>
      <div class="bar"><div class="fill" style="width:{{OVERALL_PCT}}%"></div></div>
    </section>

    <section>
      <h2>Badges</h2>
      <div class="badges">
{{BADGES}}
      </div>
      <p class="hint">{{BADGE_HINT}}</p>
    </section>

    <section>
      <h2>History</h2>
{{HISTORY}}
    </section>
"#;
