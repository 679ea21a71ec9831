//! Inline stylesheet and script for the page.

/// Page stylesheet.
pub const STYLE_CSS: &str = r#"
*,*::before,*::after{box-sizing:border-box;margin:0;padding:0}
html,body{height:100%;background:#000;color:#fff;font-family:-apple-system,BlinkMacSystemFont,"Segoe UI",Roboto,Helvetica,Arial,sans-serif}
button{font:inherit;color:inherit;cursor:pointer;border:none;background:none}
button:disabled{opacity:.5;cursor:not-allowed}
.hidden,[hidden]{display:none!important}
.inline{display:inline}
.row{display:flex;align-items:center;justify-content:space-between;gap:8px}
.muted{color:#9ca3af;font-size:12px}
.app{display:flex;height:100vh;overflow:hidden}

.sidebar{width:320px;height:100%;background:#111827;border-right:1px solid #1f2937;display:flex;flex-direction:column}
.sidebar-header{padding:16px;border-bottom:1px solid #1f2937}
.logo{height:32px}
.status-slot{margin:16px 0}
.new-chat{width:100%;display:flex;align-items:center;gap:12px;padding:12px 16px;background:#7f1d1d;border-radius:8px;font-weight:500}
.new-chat:hover{background:#991b1b}
.history{flex:1;overflow-y:auto;padding:8px}
.history h3{font-size:14px;font-weight:500;color:#9ca3af;margin:0 8px 12px}
.chat-entry{width:100%;text-align:left;padding:12px;border-radius:8px;margin-bottom:4px;border:1px solid transparent}
.chat-entry:hover{background:#1f2937}
.chat-entry.active{background:#7f1d1d;border-color:#b91c1c}
.chat-entry h4{font-size:14px;font-weight:500;white-space:nowrap;overflow:hidden;text-overflow:ellipsis;flex:1}
.chat-entry .preview{font-size:12px;color:#9ca3af;white-space:nowrap;overflow:hidden;text-overflow:ellipsis}
.chat-entry .time{font-size:12px;color:#6b7280;margin-top:4px}
.overlay{position:fixed;inset:0;background:rgba(0,0,0,.5);z-index:40;width:100%}
.mobile-only{display:none}

.main{flex:1;display:flex;flex-direction:column;min-width:0}
.chat-header{display:flex;align-items:center;justify-content:space-between;padding:16px;border-bottom:1px solid #1f2937;background:#111827}
.chat-header .title{display:flex;align-items:center;gap:12px}
.chat-header h1{font-size:16px;font-weight:600}
.icon-button{padding:8px;border-radius:4px}
.icon-button:hover{background:#1f2937}

.badge{display:inline-flex;align-items:center;gap:8px;padding:4px 12px;border-radius:9999px;font-size:12px}
.badge .dot{width:8px;height:8px;border-radius:50%;background:currentColor}
.badge-loading{background:rgba(113,63,18,.5);color:#fde047}
.badge-offline{background:rgba(127,29,29,.5);color:#fca5a5}
.badge-offline:hover{background:rgba(153,27,27,.7)}
.badge-online{background:rgba(20,83,45,.5);color:#86efac}
.spinner{width:12px;height:12px;border:2px solid currentColor;border-top-color:transparent;border-radius:50%;animation:spin 1s linear infinite}
@keyframes spin{to{transform:rotate(360deg)}}

.messages{flex:1;overflow-y:auto;padding:16px;display:flex;flex-direction:column;gap:16px}
.bubble-row{display:flex}
.bubble-row.user{justify-content:flex-end}
.bubble-row.bot{justify-content:flex-start}
.bubble{max-width:70%;border-radius:16px;padding:12px 16px;font-size:14px;line-height:1.6}
.bubble.user{background:#7f1d1d}
.bubble.bot{background:#1f2937;color:#f3f4f6}
.bubble.bot.error{background:rgba(153,27,27,.5);color:#fecaca;border:1px solid #b91c1c}
.bubble .meta{display:flex;align-items:center;justify-content:space-between;margin-top:8px;font-size:12px;opacity:.7}
.bubble .delivered{width:8px;height:8px;border-radius:50%;background:#4ade80}
.bubble .file{display:flex;align-items:center;gap:8px}
.bubble .download{margin-left:auto;cursor:pointer}
.dots{display:inline-flex;gap:4px;margin-right:8px}
.dots i{width:8px;height:8px;border-radius:50%;background:#9ca3af;animation:pulse 1.2s infinite}
.dots i:nth-child(2){animation-delay:.2s}
.dots i:nth-child(3){animation-delay:.4s}
@keyframes pulse{0%,100%{opacity:1}50%{opacity:.3}}

.composer{padding:16px;border-top:1px solid #1f2937;background:#111827}
.error-banner{margin-bottom:12px;padding:8px;background:rgba(127,29,29,.5);border:1px solid #b91c1c;border-radius:4px;color:#fecaca;font-size:14px}
.composer-row{display:flex;align-items:flex-end;gap:12px}
.grow{flex:1}
.composer textarea{width:100%;min-height:48px;max-height:128px;resize:none;background:#1f2937;border:1px solid #374151;border-radius:16px;padding:12px 16px;color:#fff;font:inherit}
.composer textarea:focus{outline:none;border-color:#ef4444}
.round{padding:12px;border-radius:9999px;background:#1f2937}
.round:hover{background:#374151}
.round.recording{background:#dc2626}
.round.send{background:#7f1d1d}
.round.send:disabled{background:#374151}

@media (max-width:1023px){
  .sidebar{position:fixed;z-index:50;transform:translateX(-100%);transition:transform .2s}
  .sidebar.open{transform:none}
  .mobile-only{display:inline}
}
"#;

/// Page script: auto-scroll, Enter-to-send, send-button state and file metadata posting.
pub const PAGE_JS: &str = r#"
(function () {
  var end = document.getElementById('messages-end');
  if (end) { end.scrollIntoView({ behavior: 'smooth' }); }

  var form = document.getElementById('composer-form');
  var input = document.getElementById('composer-input');
  var send = document.getElementById('send-button');
  var typing = document.getElementById('typing-indicator');

  function refresh() {
    if (send && input) { send.disabled = input.disabled || input.value.trim() === ''; }
  }

  if (form && input) {
    input.addEventListener('input', refresh);
    input.addEventListener('keydown', function (e) {
      if (e.key === 'Enter' && !e.shiftKey) {
        e.preventDefault();
        if (input.value.trim() !== '') { form.requestSubmit(); }
      }
    });
    form.addEventListener('submit', function (e) {
      if (input.value.trim() === '') { e.preventDefault(); return; }
      if (typing) { typing.hidden = false; }
      if (end) { end.scrollIntoView({ behavior: 'smooth' }); }
    });
    refresh();
  }

  var fileForm = document.getElementById('file-form');
  var fileInput = document.getElementById('file-input');
  var fileButton = document.getElementById('file-button');
  if (fileForm && fileInput && fileButton) {
    fileButton.addEventListener('click', function () { fileInput.click(); });
    fileInput.addEventListener('change', function () {
      var file = fileInput.files && fileInput.files[0];
      if (!file) { return; }
      fileForm.elements['file_name'].value = file.name;
      fileForm.elements['file_size'].value = String(file.size);
      fileForm.elements['file_type'].value = file.type;
      fileForm.submit();
    });
  }
})();
"#;
