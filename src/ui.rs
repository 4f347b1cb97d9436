use crate::models::{AppData, IndexQuery, Priority, Task, DAYS_OF_WEEK};
use crate::ranks::{level_for, rank, Progress};
use crate::stats::build_week_summary;
use crate::tasks::MAX_TASK_TEXT_CHARS;
use std::fmt::Write;

pub fn render_index(data: &AppData, today: u8, query: &IndexQuery) -> String {
    let day = query.day().filter(|day| usize::from(*day) < DAYS_OF_WEEK.len()).unwrap_or(today);
    let day_name = DAYS_OF_WEEK[usize::from(day)];
    let level = level_for(data.total_xp);
    let (completed, total) = data.day_counts(day);

    INDEX_HTML
        .replace("{{NOTICES}}", &render_notices(query))
        .replace("{{LEVEL}}", &render_level(&level, data.total_xp))
        .replace("{{DAYS}}", &render_days(data, today, day))
        .replace("{{PRIORITIES}}", &render_priorities())
        .replace("{{COMPLETED}}", &completed.to_string())
        .replace("{{TOTAL}}", &total.to_string())
        .replace("{{MAX_LEN}}", &MAX_TASK_TEXT_CHARS.to_string())
        .replace("{{DAY_NAME}}", day_name)
        .replace("{{DAY}}", &day.to_string())
        // last, so task text is never scanned for placeholders
        .replace("{{TASKS}}", &render_tasks(data.tasks.day(day).unwrap_or_default(), day))
}

fn render_level(level: &Progress, total_xp: u64) -> String {
    let current = level.current_rank;
    let mut html = format!(
        r#"<div class="level-header">
        <div class="badge" style="border-color: {color}">
          <span class="badge-icon">{icon}</span>
          <div><div class="level-number">Level {number}</div><div class="level-title" style="color: {color}">{title}</div></div>
        </div>
        <div class="xp-amount">{total_xp} XP</div>
      </div>"#,
        color = current.color,
        icon = current.icon,
        number = current.level,
        title = current.title,
    );

    match level.next_rank {
        Some(next) => {
            let _ = write!(
                html,
                r#"<div class="bar"><div class="bar-fill" style="width: {pct:.1}%; background: linear-gradient(90deg, {from}, {to})"></div></div>
      <div class="level-text"><span>{have} / {need} XP</span><span>Next: {icon} {title} <span style="color: {to}">(Level {number})</span></span></div>"#,
                pct = level.progress_percentage,
                from = current.color,
                to = next.color,
                have = level.xp_in_current_level,
                need = level.xp_needed_for_next,
                icon = next.icon,
                title = next.title,
                number = next.level,
            );
        }
        None => html.push_str(r#"<div class="level-text max">Maximum level reached!</div>"#),
    }
    html
}

fn render_days(data: &AppData, today: u8, selected: u8) -> String {
    build_week_summary(data, today)
        .iter()
        .map(|summary| {
            let mut class = String::from("day");
            if summary.day == selected {
                class.push_str(" active");
            }
            if summary.is_today {
                class.push_str(" today");
            }
            let count = if summary.total > 0 {
                format!("{}/{}", summary.completed, summary.total)
            } else {
                "No tasks".to_string()
            };
            format!(
                r#"<a class="{class}" href="/?day={day}"><span>{name}</span><span class="day-count">{count}</span></a>"#,
                day = summary.day,
                name = summary.name,
            )
        })
        .collect()
}

fn render_priorities() -> String {
    Priority::ALL
        .iter()
        .map(|priority| {
            let checked = if *priority == Priority::default() { " checked" } else { "" };
            format!(
                r#"<label class="priority {key}"><input type="radio" name="priority" value="{key}"{checked} /><span>{icon} {label}</span><span class="priority-xp">+{xp} XP</span></label>"#,
                key = priority.key(),
                icon = priority.icon(),
                label = priority.label(),
                xp = priority.xp(),
            )
        })
        .collect()
}

fn render_tasks(tasks: &[Task], day: u8) -> String {
    if tasks.is_empty() {
        return format!(
            r#"<div class="empty">No tasks yet. Add your first task for {}!</div>"#,
            DAYS_OF_WEEK[usize::from(day)]
        );
    }

    tasks
        .iter()
        .map(|task| {
            let priority = task.priority;
            format!(
                r#"<div class="task{done}">
          <form method="post" action="/tasks/toggle"><input type="hidden" name="day" value="{day}" /><input type="hidden" name="id" value="{id}" /><button class="check" type="submit" aria-label="Toggle task">{mark}</button></form>
          <div class="task-body"><div class="task-text">{text}</div><div class="task-meta"><span class="priority-tag {key}">{icon} {label}</span><span>{xp} XP</span></div></div>
          <form method="post" action="/tasks/delete"><input type="hidden" name="day" value="{day}" /><input type="hidden" name="id" value="{id}" /><button class="delete" type="submit" aria-label="Delete task">✕</button></form>
        </div>"#,
                done = if task.completed { " completed" } else { "" },
                mark = if task.completed { "✔" } else { "" },
                id = task.id,
                text = escape_html(&task.text),
                key = priority.key(),
                icon = priority.icon(),
                label = priority.label(),
                xp = priority.xp(),
            )
        })
        .collect()
}

fn render_notices(query: &IndexQuery) -> String {
    let mut html = String::new();
    if let Some(gained) = query.gained().filter(|gained| *gained > 0) {
        let _ = write!(html, r#"<div class="notice xp">+{gained} XP!</div>"#);
    }
    if let Some(reached) = query.levelup().and_then(rank) {
        let _ = write!(
            html,
            r#"<div class="notice levelup"><span class="badge-icon">{}</span><div><strong>LEVEL UP!</strong><div>Level {} - {}</div></div></div>"#,
            reached.icon, reached.level, reached.title
        );
    }
    html
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>WeekFlow</title>
  <style>
    :root {
      --bg: #0f172a;
      --card: #1e293b;
      --ink: #e2e8f0;
      --muted: #94a3b8;
      --accent: #8b5cf6;
      --line: rgba(148, 163, 184, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, #312e81, transparent 55%), var(--bg);
      color: var(--ink);
      font-family: "Inter", "Segoe UI", sans-serif;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(900px, 100%);
      margin: 0 auto;
      display: grid;
      gap: 22px;
    }

    header h1 {
      margin: 0;
      font-size: clamp(2rem, 4vw, 2.6rem);
    }

    header p,
    .muted {
      margin: 4px 0 0;
      color: var(--muted);
    }

    section {
      background: var(--card);
      border: 1px solid var(--line);
      border-radius: 20px;
      padding: 22px;
    }

    .level-header,
    .level-text {
      display: flex;
      justify-content: space-between;
      align-items: center;
      gap: 12px;
      flex-wrap: wrap;
    }

    .badge {
      display: flex;
      align-items: center;
      gap: 12px;
      border: 2px solid;
      border-radius: 16px;
      padding: 10px 16px;
    }

    .badge-icon {
      font-size: 2rem;
    }

    .level-number {
      font-size: 0.85rem;
      color: var(--muted);
    }

    .level-title {
      font-weight: 700;
      font-size: 1.2rem;
    }

    .xp-amount {
      font-size: 1.6rem;
      font-weight: 700;
    }

    .bar {
      margin: 16px 0 8px;
      height: 12px;
      border-radius: 999px;
      background: rgba(148, 163, 184, 0.2);
      overflow: hidden;
    }

    .bar-fill {
      height: 100%;
      border-radius: 999px;
    }

    .level-text {
      font-size: 0.9rem;
      color: var(--muted);
    }

    .level-text.max {
      justify-content: center;
      margin-top: 14px;
      color: #facc15;
    }

    .days {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(110px, 1fr));
      gap: 10px;
      padding: 0;
      background: none;
      border: none;
    }

    .day {
      display: grid;
      gap: 4px;
      text-align: center;
      padding: 12px;
      border-radius: 14px;
      background: var(--card);
      border: 1px solid var(--line);
      color: var(--ink);
      text-decoration: none;
    }

    .day.today {
      border-color: #facc15;
    }

    .day.active {
      background: var(--accent);
    }

    .day-count {
      font-size: 0.8rem;
      color: var(--muted);
    }

    .day.active .day-count {
      color: var(--ink);
    }

    form.add {
      display: grid;
      gap: 14px;
    }

    input[type="text"] {
      width: 100%;
      padding: 12px 14px;
      border-radius: 12px;
      border: 1px solid var(--line);
      background: var(--bg);
      color: var(--ink);
      font-size: 1rem;
    }

    .priorities {
      display: grid;
      grid-template-columns: repeat(3, 1fr);
      gap: 10px;
    }

    .priority {
      display: grid;
      gap: 4px;
      text-align: center;
      padding: 10px;
      border-radius: 12px;
      border: 1px solid var(--line);
      cursor: pointer;
    }

    .priority input {
      margin: 0 auto;
    }

    .priority-xp {
      font-size: 0.8rem;
      color: var(--muted);
    }

    button {
      appearance: none;
      border: none;
      cursor: pointer;
      font: inherit;
    }

    .submit {
      padding: 12px;
      border-radius: 12px;
      background: var(--accent);
      color: white;
      font-weight: 600;
    }

    .list-header {
      display: flex;
      justify-content: space-between;
      margin-bottom: 14px;
    }

    .task {
      display: flex;
      align-items: center;
      gap: 14px;
      padding: 12px;
      border-radius: 14px;
      border: 1px solid var(--line);
      margin-bottom: 10px;
    }

    .task.completed .task-text {
      text-decoration: line-through;
      color: var(--muted);
    }

    .task-body {
      flex: 1;
    }

    .task-meta {
      display: flex;
      gap: 12px;
      font-size: 0.8rem;
      color: var(--muted);
      margin-top: 4px;
    }

    .check {
      width: 26px;
      height: 26px;
      border-radius: 8px;
      border: 2px solid var(--accent);
      background: transparent;
      color: var(--ink);
    }

    .task.completed .check {
      background: var(--accent);
    }

    .delete {
      background: transparent;
      color: var(--muted);
    }

    .empty {
      text-align: center;
      color: var(--muted);
      padding: 24px 0;
    }

    .notice {
      position: fixed;
      right: 24px;
      padding: 14px 18px;
      border-radius: 14px;
      font-weight: 700;
      animation: fade 3s ease forwards;
    }

    .notice.xp {
      top: 24px;
      background: #16a34a;
    }

    .notice.levelup {
      top: 84px;
      display: flex;
      gap: 12px;
      align-items: center;
      background: linear-gradient(90deg, #8b5cf6, #ec4899);
    }

    @keyframes fade {
      0%, 70% {
        opacity: 1;
      }
      100% {
        opacity: 0;
        visibility: hidden;
      }
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>⚡ WeekFlow</h1>
      <p>Master your week, one task at a time</p>
    </header>

    <section class="xp">
      {{LEVEL}}
    </section>

    <section class="days">
      {{DAYS}}
    </section>

    <section>
      <h2>Add New Task for {{DAY_NAME}}</h2>
      <form class="add" method="post" action="/tasks/add">
        <input type="hidden" name="day" value="{{DAY}}" />
        <input type="text" name="text" placeholder="What do you need to accomplish?" maxlength="{{MAX_LEN}}" required />
        <div class="priorities">
          {{PRIORITIES}}
        </div>
        <button class="submit" type="submit">Add Task</button>
      </form>
    </section>

    <section>
      <div class="list-header">
        <strong>Tasks for {{DAY_NAME}}</strong>
        <span class="muted">{{COMPLETED}} of {{TOTAL}} completed</span>
      </div>
      {{TASKS}}
    </section>
  </main>
  {{NOTICES}}
</body>
</html>
"#;
