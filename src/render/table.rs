//! Tabbed Bootstrap page with one DataTables table per pane.

use super::html_escape;
use crate::datatable::TablePane;

const TABLE_CLASSES: &str = "cell-border display compact hover table table-striped";

fn render_table(pane: &TablePane) -> String {
    let header: String = pane
        .header
        .iter()
        .map(|h| format!("<th>{}</th>", html_escape(h)))
        .collect();
    let body: String = pane
        .rows
        .iter()
        .map(|row| {
            let cells: String = row
                .iter()
                .map(|c| format!("<td>{}</td>", html_escape(c)))
                .collect();
            format!("<tr>{cells}</tr>\n")
        })
        .collect();

    format!(
        r#"<table id="{id}" class="{TABLE_CLASSES}">
<thead><tr>{header}</tr></thead>
<tbody>
{body}</tbody>
<tfoot>
<tr><td colspan="{colspan}"><small class="text-muted">{note}</small></td></tr>
</tfoot>
</table>"#,
        id = html_escape(&pane.key),
        colspan = pane.header.len(),
        note = html_escape(&pane.note),
    )
}

fn nav_tab(index: usize, pane: &TablePane) -> String {
    let first = index == 1;
    format!(
        r##"<li class="nav-item" role="presentation">
    <button class="nav-link{active}" id="table{index}-tab" data-bs-toggle="tab" data-bs-target="#table{index}" type="button" role="tab" aria-controls="table{index}" aria-selected="{first}">{title}</button>
</li>
"##,
        active = if first { " active" } else { "" },
        title = html_escape(&pane.title),
    )
}

fn tab_pane(index: usize, pane: &TablePane) -> String {
    format!(
        r#"<div class="tab-pane fade{show}" id="table{index}" role="tabpanel" aria-labelledby="table{index}-tab">
{table}
</div>
"#,
        show = if index == 1 { " show active" } else { "" },
        table = render_table(pane),
    )
}

fn datatable_init(index: usize, pane: &TablePane) -> String {
    format!(
        r#"    var table{index} = $('#{id}').DataTable({{
        dom: 'Bfrtip',
        language: {{ search: "", searchPlaceholder: "Search a school" }},
        buttons: [
            {{ extend: 'copy', className: 'btn btn-sm btn-dt-teal' }},
            {{ extend: 'csv', className: 'btn btn-sm btn-dt-teal' }},
            {{ extend: 'excel', className: 'btn btn-sm btn-dt-teal' }}
        ],
        pageLength: 25,
        scrollX: true,
        scrollY: '500px'
    }});
"#,
        id = pane.key,
    )
}

fn inline_css() -> &'static str {
    r#".nav-tabs .nav-link { font-family: 'Georgia', serif; color: #06474D !important; }
.nav-tabs .nav-link:hover { color: #05292C !important; }
.nav-tabs .nav-link.active { color: #06474D !important; border-color: #06474D #06474D #fff !important; }
.dataTables_wrapper .dataTables_paginate .pagination .page-item.active .page-link {
    background-color: #06474D !important; border-color: #06474D !important; color: #fff !important;
}
.dataTables_wrapper .dataTables_paginate .pagination .page-item .page-link:hover {
    background-color: #05292C !important; border-color: #05292C !important; color: #fff !important;
}
.btn-dt-teal { background-color: #06474D !important; border-color: #06474D !important; color: #fff !important; }
.btn-dt-teal:hover, .btn-dt-teal:focus {
    background-color: #05292C !important; border-color: #05292C !important; color: #fff !important;
}
.tab-content, .tab-pane { font-family: 'Georgia', serif; color: #05292C; }
table.dataTable th, table.dataTable td { font-family: 'Helvetica'; color: #000000; }
table.dataTable th:first-child, table.dataTable td:first-child { position: sticky; left: 0; z-index: 2; }"#
}

/// Renders every pane as a tab, the first one active.
pub fn render_tables(panes: &[TablePane]) -> String {
    let mut tabs = String::new();
    let mut contents = String::new();
    let mut inits = String::new();
    for (i, pane) in panes.iter().enumerate() {
        let index = i + 1;
        tabs.push_str(&nav_tab(index, pane));
        contents.push_str(&tab_pane(index, pane));
        inits.push_str(&datatable_init(index, pane));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>IPEDS DataTables</title>
    <link href="https://cdnjs.cloudflare.com/ajax/libs/twitter-bootstrap/5.3.0/css/bootstrap.min.css" rel="stylesheet" crossorigin="anonymous">
    <link href="https://cdn.datatables.net/v/bs5/dt-2.3.1/b-3.2.3/b-html5-3.2.3/b-print-3.2.3/datatables.min.css" rel="stylesheet">
    <style>{css}</style>
</head>
<body class="p-4">
<ul class="nav nav-tabs" id="paneTabs" role="tablist">
{tabs}</ul>
<div class="tab-content" id="paneTabsContent">
{contents}</div>
<script src="https://code.jquery.com/jquery-3.7.0.min.js" crossorigin="anonymous"></script>
<script src="https://cdnjs.cloudflare.com/ajax/libs/twitter-bootstrap/5.3.0/js/bootstrap.bundle.min.js" crossorigin="anonymous"></script>
<script src="https://cdn.datatables.net/v/bs5/dt-2.3.1/b-3.2.3/b-html5-3.2.3/b-print-3.2.3/datatables.min.js"></script>
<script src="https://cdnjs.cloudflare.com/ajax/libs/pdfmake/0.2.7/pdfmake.min.js"></script>
<script src="https://cdnjs.cloudflare.com/ajax/libs/pdfmake/0.2.7/vfs_fonts.js"></script>
<script src="https://cdnjs.cloudflare.com/ajax/libs/jszip/3.10.1/jszip.min.js"></script>
<script>
$(document).ready(function() {{
{inits}}});
</script>
</body>
</html>
"#,
        css = inline_css(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_tab_per_pane() {
        let html = render_tables(&[
            pane("admissions", "Admissions"),
            pane("earnings", "Median Earnings"),
        ]);

        assert_eq!(html.matches("class=\"nav-item\"").count(), 2);
        assert_eq!(html.matches("role=\"tabpanel\"").count(), 2);
        assert!(html.contains("$('#admissions').DataTable"));
        assert!(html.contains("$('#earnings').DataTable"));
        assert!(html.contains("pageLength: 25"));
    }

    #[test]
    fn test_only_first_tab_active() {
        let html = render_tables(&[pane("a", "A"), pane("b", "B")]);
        assert_eq!(html.matches("nav-link active").count(), 1);
        assert_eq!(html.matches("show active").count(), 1);
        assert!(html.contains("id=\"table1-tab\""));
        assert!(html.contains("aria-selected=\"false\""));
    }

    #[test]
    fn test_cells_escaped_and_footnote_spans_columns() {
        let mut p = pane("admissions", "Admissions");
        p.rows = vec![vec!["Texas A&M".to_string(), "<b>2023</b>".to_string()]];
        let html = render_tables(&[p]);

        assert!(html.contains("<td>Texas A&amp;M</td>"));
        assert!(html.contains("<td>&lt;b&gt;2023&lt;/b&gt;</td>"));
        assert!(html.contains(
            "<td colspan=\"2\"><small class=\"text-muted\">Source: NCES IPEDS.</small>"
        ));
    }

    // Helpers

    fn pane(key: &str, title: &str) -> TablePane {
        TablePane {
            key: key.to_string(),
            title: title.to_string(),
            note: "Source: NCES IPEDS.".to_string(),
            header: vec!["School".to_string(), "Year".to_string()],
            rows: Vec::new(),
        }
    }
}
