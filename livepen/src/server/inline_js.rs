use super::util::json_inline;
use super::PublishedState;
use crate::intercept::{DECISION_MESSAGE_TYPE, INTERCEPT_MESSAGE_TYPE};
use crate::layout::PaneLayout;
use crate::relay::{ERROR_MESSAGE_TYPE, OPEN_URL_MESSAGE_TYPE};

pub(super) fn build_inline_js(state: &PublishedState, layout: &PaneLayout) -> String {
    format!(
        r##"<script>
  var state = {state};
  var layout = {layout};
  var ERROR_TYPE = {error_type};
  var OPEN_URL_TYPE = {open_type};
  var INTERCEPT_TYPE = {intercept_type};
  var DECISION_TYPE = {decision_type};
{body}
</script>"##,
        state = json_inline(state),
        layout = json_inline(layout),
        error_type = json_inline(&ERROR_MESSAGE_TYPE),
        open_type = json_inline(&OPEN_URL_MESSAGE_TYPE),
        intercept_type = json_inline(&INTERCEPT_MESSAGE_TYPE),
        decision_type = json_inline(&DECISION_MESSAGE_TYPE),
        body = SHELL_JS,
    )
}

const SHELL_JS: &str = r##"
  function post(path, body) {
    return fetch(path, {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify(body || {})
    }).then(function(r) { return r.json(); });
  }

  // ── Editors ─────────────────────────────────────────────────────
  // Requests may land out of order; the server drops any edit whose seq is
  // not above the last one it applied for that buffer.
  var editSeq = Object.assign({ markup: 0, styles: 0, script: 0 }, state.edit_seq);
  var editors = document.querySelectorAll('.editor-pane textarea');
  editors.forEach(function(ta) {
    ta.addEventListener('input', function() {
      var b = ta.dataset.buffer;
      editSeq[b] += 1;
      post('/edit', { buffer: b, text: ta.value, seq: editSeq[b] });
    });
    ta.addEventListener('keydown', function(e) {
      if (e.key === 'Tab' && !e.shiftKey) {
        e.preventDefault();
        var s = ta.selectionStart;
        ta.setRangeText('  ', s, ta.selectionEnd, 'end');
        ta.dispatchEvent(new Event('input'));
      }
    });
  });

  function reloadBuffers() {
    fetch('/buffers').then(function(r) { return r.json(); }).then(function(b) {
      editors.forEach(function(ta) {
        var text = b[ta.dataset.buffer];
        if (typeof text === 'string' && ta.value !== text && document.activeElement !== ta) {
          ta.value = text;
        }
      });
    });
  }

  // ── Toolbar ─────────────────────────────────────────────────────
  function run() { post('/run'); }
  function save() { post('/save'); }
  document.getElementById('run-btn').addEventListener('click', run);
  document.getElementById('save-btn').addEventListener('click', save);
  document.getElementById('refresh-btn').addEventListener('click', function() { post('/refresh'); });
  document.getElementById('retry-btn').addEventListener('click', function() { post('/retry'); });
  document.getElementById('auto-run').addEventListener('change', function(e) {
    post('/auto-run', { enabled: e.target.checked });
  });
  document.addEventListener('keydown', function(e) {
    var mod = e.ctrlKey || e.metaKey;
    if (mod && e.key === 'Enter') { e.preventDefault(); run(); }
    if (mod && (e.key === 's' || e.key === 'S')) { e.preventDefault(); save(); }
  });

  // ── Preview frame ───────────────────────────────────────────────
  var frameHost = document.getElementById('frame-host');
  var currentFrame = frameHost.querySelector('iframe');

  // A new token always gets a brand new frame; the old one is discarded.
  function mountFrame(token) {
    var frame = document.createElement('iframe');
    frame.className = 'preview-frame';
    frame.title = 'Preview';
    frame.setAttribute('sandbox', state.sandbox);
    frame.setAttribute('referrerpolicy', 'no-referrer');
    frame.dataset.renderToken = String(token);
    frame.src = '/preview?token=' + token;
    if (currentFrame) currentFrame.remove();
    frameHost.appendChild(frame);
    currentFrame = frame;
  }

  function unmountFrame() {
    if (currentFrame) currentFrame.remove();
    currentFrame = null;
  }

  var failedBox = document.getElementById('preview-failed');
  var failedMessage = document.getElementById('preview-failed-message');
  var banner = document.getElementById('error-banner');
  var bannerMessage = document.getElementById('error-message');
  var statusEl = document.getElementById('status');
  var autoRunBox = document.getElementById('auto-run');
  var diskRev = state.disk_rev;

  function render(s) {
    if (s.view.status === 'failed') {
      unmountFrame();
      failedMessage.textContent = s.view.message;
      failedBox.hidden = false;
    } else {
      failedBox.hidden = true;
      if (s.view.status === 'live' &&
          (!currentFrame || currentFrame.dataset.renderToken !== String(s.view.token))) {
        mountFrame(s.view.token);
      }
    }
    if (s.error) {
      bannerMessage.textContent = s.error;
      banner.hidden = false;
    } else {
      banner.hidden = true;
    }
    autoRunBox.checked = s.auto_run;
    statusEl.className = 'status' + (s.pending ? ' pending' : s.dirty ? ' dirty' : '');
    statusEl.textContent = s.pending ? 'updating…' : s.dirty ? 'not run' : '';
    if (s.disk_rev !== diskRev) {
      diskRev = s.disk_rev;
      reloadBuffers();
    }
  }

  function poll() {
    fetch('/state?rev=' + state.rev)
      .then(function(r) { return r.json(); })
      .then(function(s) { state = s; render(s); poll(); })
      .catch(function() { setTimeout(poll, 1000); });
  }

  // ── Message relay ───────────────────────────────────────────────
  function openUrl(url) {
    window.open(url, '_blank', 'noopener,noreferrer');
  }

  window.addEventListener('message', function(ev) {
    if (!currentFrame || ev.source !== currentFrame.contentWindow) return;
    var msg = ev.data;
    if (!msg || typeof msg !== 'object') return;
    if (msg.type === INTERCEPT_TYPE && msg.event && typeof msg.event === 'object') {
      var frame = currentFrame;
      var token = parseInt(frame.dataset.renderToken, 10);
      post('/intercept', { token: token, event: msg.event }).then(function(d) {
        if (d.action === 'open-in-new-tab' && d.url) openUrl(d.url);
        if (frame !== currentFrame || !frame.contentWindow) return;
        frame.contentWindow.postMessage({
          type: DECISION_TYPE, seq: msg.seq,
          prevent_default: d.prevent_default, notice: d.notice
        }, '*');
      });
      return;
    }
    if (msg.type === OPEN_URL_TYPE && typeof msg.url === 'string') {
      if (/^https?:\/\/./i.test(msg.url.trim())) openUrl(msg.url);
    } else if (!(msg.type === ERROR_TYPE && typeof msg.message === 'string')) {
      return;
    }
    post('/relay', msg);
  });
  document.getElementById('error-dismiss').addEventListener('click', function() {
    banner.hidden = true;
    post('/relay/dismiss');
  });

  // ── Layout ──────────────────────────────────────────────────────
  var body = document.body;
  var workspace = document.getElementById('workspace');
  var overlay = document.getElementById('drag-overlay');
  var panes = document.querySelectorAll('.editor-pane');

  function applyLayout(l) {
    body.dataset.arrangement = l.arrangement;
    body.classList.toggle('code-hidden', l.code_panel_hidden);
    workspace.style.setProperty('--editor-size', l.editor_panel_size + '%');
    panes.forEach(function(p, i) { p.style.flex = '0 0 ' + l.editor_splits[i] + '%'; });
  }

  // Drag state lives on the server; this only forwards pointer positions,
  // one request in flight and at most one per animation frame.
  var drag = null;
  var dragId = 0;

  function showLayout(l) {
    layout = l;
    applyLayout(layout);
  }

  function stopDrag() {
    if (drag && drag.el) drag.el.classList.remove('dragging');
    drag = null;
    overlay.hidden = true;
  }

  function beginDrag(e, handle) {
    var rect = (handle.kind === 'main' ? workspace : document.getElementById('editors')).getBoundingClientRect();
    e.preventDefault();
    var id = ++dragId;
    drag = { id: id, el: e.target, pointer: null, ready: false, inFlight: false, framed: false, ended: false };
    overlay.className = 'drag-overlay ' + handle.kind;
    overlay.hidden = false;
    drag.el.classList.add('dragging');
    post('/drag/begin', {
      handle: handle,
      origin: { x: e.clientX, y: e.clientY },
      container: { width: rect.width, height: rect.height }
    }).then(function(r) {
      if (!drag || drag.id !== id) return;
      if (!r.active) { stopDrag(); return; }
      drag.ready = true;
      if (drag.ended) finishDrag(); else pump();
    });
  }

  function pump() {
    if (!drag || !drag.ready || drag.inFlight || !drag.pointer) return;
    var id = drag.id;
    var pointer = drag.pointer;
    drag.pointer = null;
    drag.inFlight = true;
    post('/drag/move', { pointer: pointer }).then(function(r) {
      if (!drag || drag.id !== id) return;
      drag.inFlight = false;
      showLayout(r.layout);
      pump();
    });
  }

  function finishDrag() {
    var pointer = drag.pointer;
    stopDrag();
    post('/drag/end', { pointer: pointer }).then(function(r) { showLayout(r.layout); });
  }

  document.addEventListener('pointermove', function(e) {
    if (!drag || drag.ended) return;
    drag.pointer = { x: e.clientX, y: e.clientY };
    if (drag.framed) return;
    drag.framed = true;
    var id = drag.id;
    requestAnimationFrame(function() {
      if (!drag || drag.id !== id) return;
      drag.framed = false;
      pump();
    });
  });

  function endDrag() {
    if (!drag) return;
    if (!drag.ready) { drag.ended = true; overlay.hidden = true; return; }
    finishDrag();
  }

  document.addEventListener('pointerup', endDrag);
  document.addEventListener('pointercancel', function() {
    if (!drag) return;
    stopDrag();
    post('/drag/cancel').then(function(r) { showLayout(r.layout); });
  });
  window.addEventListener('blur', endDrag);

  document.getElementById('split-main').addEventListener('pointerdown', function(e) {
    beginDrag(e, { kind: 'main' });
  });
  document.querySelectorAll('.split-editor').forEach(function(el) {
    el.addEventListener('pointerdown', function(e) {
      beginDrag(e, { kind: 'editor', index: parseInt(el.dataset.index, 10) });
    });
  });

  document.getElementById('arrangement').addEventListener('change', function(e) {
    layout.arrangement = e.target.value;
    applyLayout(layout);
    post('/layout', { arrangement: layout.arrangement });
  });
  document.getElementById('toggle-code').addEventListener('click', function() {
    layout.code_panel_hidden = !layout.code_panel_hidden;
    applyLayout(layout);
    post('/layout', { code_panel_hidden: layout.code_panel_hidden });
  });

  applyLayout(layout);
  render(state);
  poll();"##;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::EditSeq;

    #[test]
    fn inline_js_embeds_limits_and_message_types() {
        let state = PublishedState {
            rev: 3,
            disk_rev: 0,
            token: crate::RenderToken::new(2),
            view: crate::HostView::Live {
                token: crate::RenderToken::new(2),
            },
            error: Some("</script>".into()),
            auto_run: true,
            pending: false,
            dirty: false,
            sandbox: "allow-scripts allow-modals".into(),
            edit_seq: EditSeq {
                markup: 4,
                ..Default::default()
            },
        };
        let js = build_inline_js(&state, &PaneLayout::default());
        assert!(js.contains(r#"var ERROR_TYPE = "preview-error";"#));
        assert!(js.contains(r#"var INTERCEPT_TYPE = "preview-intercept";"#));
        assert!(js.contains(r#""edit_seq":{"markup":4,"styles":0,"script":0}"#));
        assert!(js.contains(r#"<\/script>"#));
        assert_eq!(js.matches("</script>").count(), 1);
    }

    #[test]
    fn edits_carry_sequence_numbers() {
        assert!(SHELL_JS.contains("post('/edit', { buffer: b, text: ta.value, seq: editSeq[b] });"));
    }

    #[test]
    fn drags_are_computed_by_the_server() {
        for route in ["/drag/begin", "/drag/move", "/drag/end", "/drag/cancel"] {
            assert!(SHELL_JS.contains(route), "{route}");
        }
        assert!(!SHELL_JS.contains("computeDrag"));
        assert!(!SHELL_JS.contains("LIMITS"));
    }
}
