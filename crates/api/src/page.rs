//! Minimal HTML shell that hands the chart JSON to Highcharts in the browser.

const HIGHCHARTS_SRC: &str = "https://code.highcharts.com/highcharts.js";

pub fn render_chart_page(title: &str, chart_json: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="ko">
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="{HIGHCHARTS_SRC}"></script>
</head>
<body>
<div id="container" style="min-width: 310px; height: 600px; margin: 0 auto"></div>
<script>
Highcharts.chart('container', {chart});
</script>
</body>
</html>
"#,
        title = escape_html(title),
        chart = escape_script(chart_json),
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// JSON is valid JavaScript, but `</` inside a string would close the script
/// element early.
fn escape_script(json: &str) -> String {
    json.replace("</", "<\\/")
}
