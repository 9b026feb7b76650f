pub(super) fn build_css() -> &'static str {
    r#"* { margin: 0; padding: 0; box-sizing: border-box; }
html, body { width: 100%; height: 100%; background: #0A0A0A; color: #A0A0A0;
  font-family: 'JetBrains Mono', monospace; font-size: 12px; overflow: hidden; }

/* ── Toolbar ─────────────────────────────────────── */
.toolbar {
  height: 36px; display: flex; align-items: center; padding: 0 14px;
  border-bottom: 1px solid #2A2A2A; font-size: 11px; gap: 10px;
  background: #0A0A0A; user-select: none;
}
.toolbar .label { color: #666; }
.toolbar .project { color: #D4AF37; font-weight: 600; }
.toolbar .sep { color: #333; }
.toolbar .status { color: #666; font-size: 10px; }
.toolbar .status.pending { color: #F59E0B; }
.toolbar .status.dirty { color: #A0A0A0; }
.toolbar .actions { margin-left: auto; display: flex; gap: 6px; align-items: center; }
.toolbar .actions button, .toolbar .actions a, .toolbar .actions select {
  background: #1F1F1F; border: 1px solid #2A2A2A; color: #A0A0A0;
  padding: 3px 10px; border-radius: 3px; font-size: 10px; cursor: pointer;
  font-family: inherit; text-decoration: none; display: inline-flex;
  align-items: center;
}
.toolbar .actions button:hover, .toolbar .actions a:hover {
  color: #FFF; border-color: #444;
}
.toolbar .actions button.primary { color: #22C55E; border-color: #1F3F2A; }
.toolbar .actions label { display: inline-flex; gap: 4px; align-items: center; font-size: 10px; }

/* ── Workspace ───────────────────────────────────── */
.workspace {
  display: flex; height: calc(100vh - 36px);
  --editor-size: 50%;
}
body[data-arrangement="left"] .workspace { flex-direction: row; }
body[data-arrangement="right"] .workspace { flex-direction: row-reverse; }
body[data-arrangement="bottom"] .workspace { flex-direction: column-reverse; }
body[data-arrangement="hidden"] .editors,
body[data-arrangement="hidden"] .split-main,
body.code-hidden .editors,
body.code-hidden .split-main { display: none; }

.editors {
  flex: 0 0 var(--editor-size); display: flex; flex-direction: column;
  min-width: 0; min-height: 0;
}
body[data-arrangement="bottom"] .editors { flex-direction: row; }

.editor-pane { position: relative; display: flex; flex-direction: column; min-height: 0; min-width: 0; }
.editor-pane .panel-label {
  height: 22px; line-height: 22px; padding: 0 12px; font-size: 10px; color: #444;
  text-transform: uppercase; letter-spacing: 1px; border-bottom: 1px solid #1A1A1A;
}
.editor-pane textarea {
  flex: 1; width: 100%; resize: none; border: none; outline: none;
  background: #0E0E0E; color: #D4D4D4; padding: 10px 12px;
  font-family: inherit; font-size: 12px; line-height: 1.6; tab-size: 2;
}

.split-main, .split-editor { background: #2A2A2A; flex: 0 0 4px; touch-action: none; }
.split-main:hover, .split-editor:hover, .dragging { background: #444; }
body[data-arrangement="left"] .split-main,
body[data-arrangement="right"] .split-main { cursor: col-resize; }
body[data-arrangement="bottom"] .split-main { cursor: row-resize; }
.split-editor { cursor: row-resize; }
body[data-arrangement="bottom"] .split-editor { cursor: col-resize; }

/* ── Preview ─────────────────────────────────────── */
.preview { flex: 1; position: relative; min-width: 0; min-height: 0; background: #FFF; }
.preview iframe { width: 100%; height: 100%; border: none; display: block; background: #FFF; }

.preview-failed {
  position: absolute; inset: 0; display: flex; flex-direction: column;
  align-items: center; justify-content: center; gap: 12px;
  background: #0A0A0A; color: #EF4444;
}
.preview-failed[hidden] { display: none; }
.preview-failed h2 { font-size: 14px; font-weight: 600; }
.preview-failed p { font-size: 11px; color: #A0A0A0; max-width: 420px; text-align: center; }
.preview-failed button {
  background: #1F1F1F; border: 1px solid #3F1818; color: #EF4444;
  padding: 4px 14px; border-radius: 3px; font-family: inherit; cursor: pointer;
}

.error-banner {
  position: absolute; left: 0; right: 0; bottom: 0; z-index: 5;
  display: flex; align-items: flex-start; gap: 10px;
  padding: 8px 12px; background: rgba(20,8,8,0.95); color: #EF4444;
  border-top: 1px solid #3F1818; font-size: 11px;
  animation: banner-in 0.15s ease-out;
}
.error-banner[hidden] { display: none; }
.error-banner .message { flex: 1; white-space: pre-wrap; word-break: break-word; }
.error-banner button {
  background: none; border: none; color: #A0A0A0; cursor: pointer; font-size: 14px;
}
@keyframes banner-in {
  from { transform: translateY(100%); }
  to { transform: translateY(0); }
}

/* ── Drag overlay ────────────────────────────────── */
.drag-overlay { position: fixed; inset: 0; z-index: 1000; }
.drag-overlay[hidden] { display: none; }
body[data-arrangement="bottom"] .drag-overlay.main { cursor: row-resize; }
.drag-overlay.main { cursor: col-resize; }
.drag-overlay.editor { cursor: row-resize; }
body[data-arrangement="bottom"] .drag-overlay.editor { cursor: col-resize; }
"#
}
