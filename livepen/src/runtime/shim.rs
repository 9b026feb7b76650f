//! JavaScript runtime shim injected into every preview document.
//!
//! It is installed in `<head>`, before any user code. The script only
//! cancels and forwards: every decision is made by
//! [`crate::intercept::RuntimeShim`] on the host side, which answers with a
//! decision message carrying the notice text.

use std::sync::OnceLock;

use super::helpers::js_string;
use crate::intercept::{DECISION_MESSAGE_TYPE, INTERCEPT_MESSAGE_TYPE, NOTICE_DURATION};

/// Id of the lazily created notice element.
pub const NOTICE_ELEMENT_ID: &str = "__livepen-notice";

/// Global function the wrapped user script reports caught exceptions to.
pub const REPORT_FN: &str = "__livepenReport";

/// The shim is identical for every document, so it is generated once.
pub fn shim_js() -> &'static str {
    static SHIM: OnceLock<String> = OnceLock::new();
    SHIM.get_or_init(generate_shim_js)
}

fn generate_shim_js() -> String {
    let config = format!(
        r#"{{
    noticeId: {notice_id},
    noticeMs: {notice_ms},
    interceptType: {intercept_type},
    decisionType: {decision_type}
  }}"#,
        notice_id = js_string(NOTICE_ELEMENT_ID),
        notice_ms = NOTICE_DURATION.as_millis(),
        intercept_type = js_string(INTERCEPT_MESSAGE_TYPE),
        decision_type = js_string(DECISION_MESSAGE_TYPE),
    );

    format!(
        "(function () {{\n  'use strict';\n  var CFG = {config};\n{body}\n  window.{report} = report;\n}})();",
        body = SHIM_BODY,
        report = REPORT_FN,
    )
}

const SHIM_BODY: &str = r#"
  var hosted = window.parent !== window;
  var notice = null;
  var hideTimer = 0;
  var nextSeq = 1;
  var pending = {};
  var replaying = false;
  var allowedUrl = null;

  function post(msg) {
    try { window.parent.postMessage(msg, '*'); } catch (_) {}
  }

  // ── Notices ──────────────────────────────────────────────────────────
  function show(text) {
    if (!notice) {
      notice = document.createElement('div');
      notice.id = CFG.noticeId;
      notice.setAttribute('role', 'status');
    }
    // User code may have replaced the body since the last notice.
    if (!notice.isConnected) {
      (document.body || document.documentElement).appendChild(notice);
    }
    notice.textContent = text;
    notice.classList.add('visible');
    clearTimeout(hideTimer);
    hideTimer = setTimeout(function () { notice.classList.remove('visible'); }, CFG.noticeMs);
  }

  // ── Host round trip ──────────────────────────────────────────────────
  function intercept(event, el) {
    var seq = nextSeq++;
    if (el) pending[seq] = el;
    post({ type: CFG.interceptType, seq: seq, event: event });
  }

  function replay(el) {
    replaying = true;
    try {
      if (el.tagName === 'FORM') {
        allowedUrl = el.action;
        HTMLFormElement.prototype.submit.call(el);
      } else {
        allowedUrl = el.href;
        el.click();
      }
    } finally {
      replaying = false;
    }
  }

  window.addEventListener('message', function (ev) {
    if (ev.source !== window.parent) return;
    var d = ev.data;
    if (!d || typeof d !== 'object' || d.type !== CFG.decisionType) return;
    var el = pending[d.seq];
    delete pending[d.seq];
    if (d.notice) show(d.notice);
    if (el && !d.prevent_default) replay(el);
  });

  // ── Links and forms ──────────────────────────────────────────────────
  if (hosted) {
    document.addEventListener('click', function (ev) {
      if (replaying) return;
      var el = ev.target;
      while (el && el.nodeType !== 1) el = el.parentNode;
      var a = el && el.closest ? el.closest('a') : null;
      if (!a) return;
      ev.preventDefault();
      var href = a.getAttribute('href') || '';
      var id = href.trim().charAt(0) === '#' ? href.trim().slice(1) : '';
      intercept({ kind: 'link', href: href, anchor: !!(id && document.getElementById(id)) }, a);
    }, true);

    document.addEventListener('submit', function (ev) {
      var form = ev.target;
      if (!form || form.tagName !== 'FORM') return;
      ev.preventDefault();
      intercept({ kind: 'form', action: form.getAttribute('action') || '' }, form);
    }, true);
  }

  // ── Navigation ───────────────────────────────────────────────────────
  // Location.assign/replace cannot be overridden; the Navigation API is
  // the only place script navigation can be cancelled.
  function withoutQuery(url) { return String(url).split(/[?#]/)[0]; }

  if (hosted && window.navigation && navigation.addEventListener) {
    navigation.addEventListener('navigate', function (e) {
      if (!e.cancelable || e.hashChange) return;
      var url = e.destination ? String(e.destination.url) : '';
      if (allowedUrl !== null && withoutQuery(url) === withoutQuery(allowedUrl)) {
        allowedUrl = null;
        return;
      }
      e.preventDefault();
      intercept({ kind: 'navigate', url: url }, null);
    });
  }

  // ── Errors ───────────────────────────────────────────────────────────
  function messageOf(value) {
    if (value && typeof value === 'object' && 'message' in value) {
      return value.name ? value.name + ': ' + value.message : String(value.message);
    }
    return String(value);
  }

  function report(value) {
    intercept({ kind: 'error', message: messageOf(value) }, null);
  }

  window.addEventListener('error', function (ev) {
    ev.preventDefault();
    report(ev.error || ev.message);
  });

  window.addEventListener('unhandledrejection', function (ev) {
    ev.preventDefault();
    intercept({ kind: 'rejection', reason: messageOf(ev.reason) }, null);
  });"#;
