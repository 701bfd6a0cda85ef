// This file is part of QuillPress.
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later).

use actix_web::{HttpResponse, Result};

pub fn serve_404(site_name: &str) -> Result<HttpResponse> {
    Ok(HttpResponse::NotFound()
        .content_type("text/html; charset=utf-8")
        .insert_header(("Cache-Control", "no-cache, no-store, must-revalidate"))
        .body(error_html(site_name, "404", "Page not found")))
}

pub fn serve_403(site_name: &str) -> Result<HttpResponse> {
    Ok(HttpResponse::Forbidden()
        .content_type("text/html; charset=utf-8")
        .body(error_html(
            site_name,
            "403",
            "You do not have permission to do that",
        )))
}

pub fn serve_500(site_name: &str) -> Result<HttpResponse> {
    Ok(HttpResponse::InternalServerError()
        .content_type("text/html; charset=utf-8")
        .body(error_html(site_name, "500", "Something went wrong")))
}

fn error_html(site_name: &str, code: &str, message: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><title>{code} - {site}</title></head>\
         <body><h1>{code}</h1><p>{message}</p><p><a href=\"/\">Back to {site}</a></p></body></html>",
        code = code,
        site = site_name,
        message = message,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_pages_carry_code_and_site_name() {
        let html = error_html("QuillPress", "404", "Page not found");
        assert!(html.contains("404"));
        assert!(html.contains("QuillPress"));
        assert!(html.contains("Page not found"));
    }
}
