//! Static files for the chat widget.

pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Mood Check-in</title>
  <link rel="stylesheet" href="/style.css">
</head>
<body>
  <main class="chat">
    <header class="chat-header">
      <h1>Mood Check-in</h1>
      <button id="restart" type="button" title="Start over">New chat</button>
    </header>
    <div id="chatbox" class="chatbox" aria-live="polite"></div>
    <div id="charts"></div>
    <form id="chat-form" class="chat-form" autocomplete="off">
      <input id="user-input" type="text" placeholder="Type a message..." aria-label="Message">
      <button id="mic" type="button" title="Speak">🎤</button>
      <button type="submit">Send</button>
    </form>
  </main>
  <script src="/app.js"></script>
</body>
</html>
"#;

pub const STYLE_CSS: &str = r#"* { box-sizing: border-box; }
body {
  margin: 0;
  font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
  background: #f3f1fa;
  color: #2d2a3e;
}
.chat {
  max-width: 640px;
  margin: 0 auto;
  height: 100vh;
  display: flex;
  flex-direction: column;
  padding: 12px;
}
.chat-header {
  display: flex;
  align-items: center;
  justify-content: space-between;
}
.chat-header h1 { font-size: 1.25rem; margin: 8px 0; }
.chatbox {
  flex: 1;
  overflow-y: auto;
  background: #fff;
  border-radius: 12px;
  padding: 12px;
  display: flex;
  flex-direction: column;
  gap: 8px;
}
.message {
  max-width: 80%;
  padding: 8px 12px;
  border-radius: 12px;
  line-height: 1.4;
  word-wrap: break-word;
}
.message.bot { background: #e7e2f7; align-self: flex-start; }
.message.user { background: #7a5cc7; color: #fff; align-self: flex-end; }
.chart {
  background: #fff;
  border-radius: 12px;
  padding: 12px;
  margin-top: 8px;
}
.chart h2 { font-size: 1rem; margin: 0 0 8px; text-align: center; }
.chart-row { display: flex; align-items: center; gap: 8px; margin: 4px 0; }
.chart-label { width: 72px; text-align: right; font-size: 0.9rem; }
.chart-bar { background: #9b7fe0; height: 18px; border-radius: 4px; min-width: 2px; }
.chart-value { font-size: 0.85rem; }
.chat-form { display: flex; gap: 8px; margin-top: 8px; }
.chat-form input {
  flex: 1;
  padding: 10px;
  border: 1px solid #ccc4e6;
  border-radius: 8px;
  font-size: 1rem;
}
button {
  padding: 8px 12px;
  border: none;
  border-radius: 8px;
  background: #7a5cc7;
  color: #fff;
  cursor: pointer;
}
button:disabled { background: #bbb; cursor: not-allowed; }
"#;

pub const APP_JS: &str = r#"(function () {
  "use strict";

  const chatbox = document.getElementById("chatbox");
  const charts = document.getElementById("charts");
  const form = document.getElementById("chat-form");
  const input = document.getElementById("user-input");
  const mic = document.getElementById("mic");
  const restart = document.getElementById("restart");

  let socket = null;

  function connect() {
    const scheme = location.protocol === "https:" ? "wss" : "ws";
    socket = new WebSocket(scheme + "://" + location.host + "/ws");
    socket.onmessage = function (event) {
      let msg;
      try { msg = JSON.parse(event.data); } catch (_) { return; }
      if (msg.type === "message") {
        appendMessage(msg.sender, msg.content);
        if (msg.sender === "bot" && msg.speech) speak(msg.speech);
      } else if (msg.type === "chart") {
        drawChart(msg.chart);
      } else if (msg.type === "reset") {
        // Sent ahead of a fresh session's welcome, after any older replies
        chatbox.innerHTML = "";
        charts.innerHTML = "";
      }
    };
    socket.onclose = function () {
      appendMessage("bot", "Connection lost. Reload the page to start again.");
    };
  }

  function send(payload) {
    if (socket && socket.readyState === WebSocket.OPEN) {
      socket.send(JSON.stringify(payload));
    }
  }

  function appendMessage(sender, html) {
    const div = document.createElement("div");
    div.className = "message " + sender;
    div.innerHTML = html;
    chatbox.appendChild(div);
    chatbox.scrollTop = chatbox.scrollHeight;
  }

  function escapeText(text) {
    const div = document.createElement("div");
    div.textContent = text;
    return div.innerHTML;
  }

  function pickVoice() {
    const voices = window.speechSynthesis.getVoices();
    return voices.find(function (v) {
      return v.name.includes("Daniel") || v.name.includes("Male");
    }) || null;
  }

  function speak(text) {
    if (!("speechSynthesis" in window)) return;
    const utterance = new SpeechSynthesisUtterance(text);
    utterance.lang = "en-GB";
    const voice = pickVoice();
    if (voice) utterance.voice = voice;
    window.speechSynthesis.speak(utterance);
  }

  function drawChart(chart) {
    charts.innerHTML = "";
    const box = document.createElement("div");
    box.className = "chart";
    const title = document.createElement("h2");
    title.textContent = chart.title;
    box.appendChild(title);

    const max = Math.max(1, ...chart.values);
    chart.labels.forEach(function (label, i) {
      const row = document.createElement("div");
      row.className = "chart-row";
      row.title = chart.label;

      const name = document.createElement("span");
      name.className = "chart-label";
      name.textContent = label;

      const bar = document.createElement("div");
      bar.className = "chart-bar";
      bar.style.width = (chart.values[i] / max) * 70 + "%";

      const value = document.createElement("span");
      value.className = "chart-value";
      value.textContent = chart.values[i];

      row.appendChild(name);
      row.appendChild(bar);
      row.appendChild(value);
      box.appendChild(row);
    });
    charts.appendChild(box);
    chatbox.scrollTop = chatbox.scrollHeight;
  }

  form.addEventListener("submit", function (event) {
    event.preventDefault();
    const text = input.value.trim();
    if (!text) return;
    appendMessage("user", escapeText(text));
    send({ type: "message", content: text });
    input.value = "";
  });

  restart.addEventListener("click", function () {
    send({ type: "restart" });
  });

  const Recognition = window.SpeechRecognition || window.webkitSpeechRecognition;
  if (Recognition) {
    mic.addEventListener("click", function () {
      const recognition = new Recognition();
      recognition.lang = "en-US";
      recognition.interimResults = false;
      recognition.maxAlternatives = 1;
      recognition.onresult = function (event) {
        input.value = event.results[0][0].transcript;
        form.requestSubmit();
      };
      recognition.onerror = function () {};
      recognition.start();
    });
  } else {
    mic.disabled = true;
    mic.title = "Voice not supported";
  }

  connect();
})();
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_clears_on_reset_frame_only() {
        assert!(APP_JS.contains(r#"msg.type === "reset""#));
        let click = APP_JS
            .split(r#"restart.addEventListener("click""#)
            .nth(1)
            .unwrap();
        let handler = &click[..click.find("});").unwrap()];
        assert!(!handler.contains("innerHTML"));
        assert!(handler.contains(r#"type: "restart""#));
    }

    #[test]
    fn test_page_references_served_assets() {
        assert!(INDEX_HTML.contains(r#"href="/style.css""#));
        assert!(INDEX_HTML.contains(r#"src="/app.js""#));
    }
}
